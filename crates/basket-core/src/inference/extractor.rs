//! Pattern-table extraction of structured specs from line-item descriptions.

use regex::{Captures, Regex};

use crate::models::catalog::Category;
use crate::models::spec::{
    MemoryFragment, NetworkFragment, ProcessorFragment, SpecFragment, StorageFragment,
};

use super::rules::patterns::*;
use super::rules::values::{
    compact_capacity, extract_cores, extract_frequency, extract_tdp, extract_threads,
    format_frequency, format_port_speed, normalize_capacity, port_count,
};

/// One named regex. Named groups map onto fragment fields:
/// `count`, `model`, `cores`, `threads`, `frequency`, `tdp` (processor);
/// `total`, `modules`, `module_capacity`, `capacity`, `generation`, `speed`,
/// `form_factor` (memory); `slot_count`, `slot_size`, `capacity`,
/// `interface`, `raid` (storage); `ports`, `port_speed`, `port_type` (network).
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: String,
    pub regex: Regex,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, regex: &Regex) -> Self {
        Self {
            name: name.into(),
            regex: regex.clone(),
        }
    }
}

/// Ordered pattern lists per structured category. The first match wins.
#[derive(Debug, Clone, Default)]
pub struct SpecRules {
    pub processor: Vec<PatternRule>,
    pub memory: Vec<PatternRule>,
    pub storage: Vec<PatternRule>,
    pub network: Vec<PatternRule>,
}

impl SpecRules {
    pub fn dell() -> Self {
        Self {
            processor: vec![
                PatternRule::new("count_x_model", &PROCESSOR_COUNT_MODEL),
                PatternRule::new("family_model", &PROCESSOR_FAMILY_MODEL),
            ],
            memory: vec![
                PatternRule::new("total_modules", &MEMORY_TOTAL_MODULES),
                PatternRule::new("modules", &MEMORY_MODULES),
                PatternRule::new("dimm", &MEMORY_DIMM),
                PatternRule::new("truddr", &MEMORY_TRUDDR),
                PatternRule::new("total_only", &MEMORY_TOTAL_ONLY),
            ],
            storage: storage_rules(),
            network: network_rules(),
        }
    }

    pub fn lenovo() -> Self {
        Self {
            processor: vec![
                PatternRule::new("family_model", &PROCESSOR_FAMILY_MODEL),
                PatternRule::new("count_x_model", &PROCESSOR_COUNT_MODEL),
            ],
            memory: vec![
                PatternRule::new("truddr", &MEMORY_TRUDDR),
                PatternRule::new("dimm", &MEMORY_DIMM),
                PatternRule::new("total_modules", &MEMORY_TOTAL_MODULES),
            ],
            storage: storage_rules(),
            network: network_rules(),
        }
    }

    pub fn generic() -> Self {
        Self {
            processor: vec![
                PatternRule::new("count_x_model", &PROCESSOR_COUNT_MODEL),
                PatternRule::new("family_model", &PROCESSOR_FAMILY_MODEL),
            ],
            memory: vec![
                PatternRule::new("total_modules", &MEMORY_TOTAL_MODULES),
                PatternRule::new("truddr", &MEMORY_TRUDDR),
                PatternRule::new("dimm", &MEMORY_DIMM),
                PatternRule::new("modules", &MEMORY_MODULES),
                PatternRule::new("total_only", &MEMORY_TOTAL_ONLY),
            ],
            storage: storage_rules(),
            network: network_rules(),
        }
    }

    pub fn rules_for(&self, category: Category) -> &[PatternRule] {
        match category {
            Category::Processor => &self.processor,
            Category::Memory => &self.memory,
            Category::Storage => &self.storage,
            Category::Network => &self.network,
            _ => &[],
        }
    }

    /// Structured fragment for `description`, or `Unparsed` when nothing matches.
    /// Never fails.
    pub fn extract(&self, category: Category, description: &str) -> SpecFragment {
        let raw = description.trim();
        if raw.is_empty() {
            return SpecFragment::unparsed(category, raw);
        }

        for rule in self.rules_for(category) {
            if let Some(caps) = rule.regex.captures(raw) {
                let fragment = match category {
                    Category::Processor => SpecFragment::Processor(processor_fragment(&caps, raw)),
                    Category::Memory => SpecFragment::Memory(memory_fragment(&caps, raw)),
                    Category::Storage => SpecFragment::Storage(storage_fragment(&caps, raw)),
                    Category::Network => SpecFragment::Network(network_fragment(&caps, raw)),
                    _ => break,
                };
                return fragment;
            }
        }

        SpecFragment::unparsed(category, raw)
    }
}

fn storage_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new("raid_controller", &STORAGE_RAID),
        PatternRule::new("backplane", &STORAGE_BACKPLANE),
        PatternRule::new("slots", &STORAGE_SLOTS),
        PatternRule::new("chassis_bays", &STORAGE_CHASSIS_BAYS),
        PatternRule::new("drive", &STORAGE_DRIVE),
    ]
}

fn network_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new("word_ports", &NETWORK_WORD_PORTS),
        PatternRule::new("speed_ports", &NETWORK_SPEED_PORTS),
        PatternRule::new("count_x_speed", &NETWORK_COUNT_SPEED),
    ]
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}

fn group_u32(caps: &Captures<'_>, name: &str) -> Option<u32> {
    group(caps, name).and_then(|s| s.parse().ok())
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn processor_fragment(caps: &Captures<'_>, raw: &str) -> ProcessorFragment {
    ProcessorFragment {
        count: group_u32(caps, "count"),
        model: group(caps, "model").map(str::to_string),
        cores: group_u32(caps, "cores").or_else(|| extract_cores(raw)),
        threads: group_u32(caps, "threads").or_else(|| extract_threads(raw)),
        tdp: group_u32(caps, "tdp").or_else(|| extract_tdp(raw)),
        base_frequency: group(caps, "frequency")
            .and_then(format_frequency)
            .or_else(|| extract_frequency(raw)),
        raw: raw.to_string(),
    }
}

fn memory_fragment(caps: &Captures<'_>, raw: &str) -> MemoryFragment {
    let memory_type = group(caps, "generation")
        .map(|g| format!("DDR{}", g))
        .or_else(|| DDR_TYPE.captures(raw).map(|c| format!("DDR{}", &c[1])));
    let speed = group(caps, "speed")
        .map(|s| s.replace(' ', ""))
        .or_else(|| MEMORY_SPEED.captures(raw).map(|c| format!("{}{}", &c[1], &c[2])));

    MemoryFragment {
        total_capacity: group(caps, "total").and_then(normalize_capacity),
        module_count: group_u32(caps, "modules"),
        module_capacity: group(caps, "module_capacity").and_then(normalize_capacity),
        capacity: group(caps, "capacity").and_then(normalize_capacity),
        memory_type,
        speed,
        form_factor: group(caps, "form_factor").map(|f| squash(&f.to_uppercase())),
        raw: raw.to_string(),
    }
}

fn storage_fragment(caps: &Captures<'_>, raw: &str) -> StorageFragment {
    let capacity = group(caps, "capacity").and_then(compact_capacity);
    let slot_size = group(caps, "slot_size")
        .map(|s| format!("{}\"", s))
        .or_else(|| {
            // Drive lines carry their form factor somewhere in the text
            capacity
                .as_ref()
                .and(SLOT_SIZE.captures(raw))
                .map(|c| format!("{}\"", &c[1]))
        });

    StorageFragment {
        slot_count: group_u32(caps, "slot_count"),
        slot_size,
        capacity,
        interface: group(caps, "interface").map(normalize_interface),
        raid_controller: group(caps, "raid").map(squash),
        raw: raw.to_string(),
    }
}

fn normalize_interface(interface: &str) -> String {
    interface
        .split('/')
        .map(|part| {
            if part.eq_ignore_ascii_case("nvme") {
                "NVMe".to_string()
            } else {
                part.to_uppercase()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn network_fragment(caps: &Captures<'_>, raw: &str) -> NetworkFragment {
    let port_type = group(caps, "port_type")
        .map(str::to_string)
        .or_else(|| PORT_TYPE.captures(raw).map(|c| c[1].to_string()))
        .map(|t| t.to_uppercase());

    NetworkFragment {
        port_count: group(caps, "ports").and_then(port_count),
        speed: group(caps, "port_speed").map(format_port_speed),
        port_type,
        raw: raw.to_string(),
    }
}
