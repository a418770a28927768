//! Folding ordered line-item fragments into one consolidated specification.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::models::spec::{
    ConsolidatedSpecification, MemoryFragment, MemorySpec, NetworkPortGroup, NetworkSpec,
    ProcessorSpec, SpecFragment, StorageSlot, StorageSpec,
};

use super::rules::values::{format_capacity_gb, parse_capacity_gb};

/// A fragment together with the quantity of its line item.
#[derive(Debug, Clone, Copy)]
pub struct SpecLine<'a> {
    pub fragment: &'a SpecFragment,
    pub quantity: u32,
}

impl<'a> SpecLine<'a> {
    pub fn new(fragment: &'a SpecFragment, quantity: u32) -> Self {
        Self { fragment, quantity }
    }
}

/// Consolidate lines in source order. Pure: the same lines always give the
/// same result.
pub fn aggregate(lines: &[SpecLine<'_>]) -> ConsolidatedSpecification {
    let mut spec = ConsolidatedSpecification::default();
    let mut memory = MemoryTotals::default();

    for line in lines {
        let qty = line.quantity.max(1);
        match line.fragment {
            SpecFragment::Processor(p) => {
                // Last processor line wins
                spec.processor = Some(ProcessorSpec {
                    count: p.count.unwrap_or(qty),
                    model: p.model.clone().unwrap_or_default(),
                    cores: p.cores,
                    threads: p.threads,
                    base_frequency: p.base_frequency.clone(),
                    tdp: p.tdp,
                });
            }
            SpecFragment::Memory(m) => memory.add(m, qty),
            SpecFragment::Storage(s) => {
                let storage = spec.storage.get_or_insert_with(StorageSpec::default);
                if let Some(raid) = &s.raid_controller {
                    storage.raid_controller = Some(raid.clone());
                }
                let count = match (s.slot_count, &s.capacity) {
                    (Some(slots), _) => Some(slots.saturating_mul(qty)),
                    (None, Some(_)) => Some(qty),
                    (None, None) => None,
                };
                if let Some(count) = count {
                    storage.slots.push(StorageSlot {
                        count,
                        size: s.slot_size.clone(),
                        interface: s.interface.clone(),
                        capacity: s.capacity.clone(),
                    });
                }
            }
            SpecFragment::Network(n) => {
                let network = spec.network.get_or_insert_with(NetworkSpec::default);
                let count = n.port_count.unwrap_or(1).saturating_mul(qty);
                let existing = n
                    .speed
                    .as_ref()
                    .and_then(|speed| network.ports.iter_mut().find(|g| g.speed.as_ref() == Some(speed)));
                match existing {
                    Some(group) => {
                        group.count = group.count.saturating_add(count);
                        if group.port_type.is_none() {
                            group.port_type = n.port_type.clone();
                        }
                    }
                    None => network.ports.push(NetworkPortGroup {
                        count,
                        speed: n.speed.clone(),
                        port_type: n.port_type.clone(),
                    }),
                }
            }
            SpecFragment::Unparsed { .. } => {}
        }
    }

    spec.memory = memory.finish();
    spec
}

/// Keep every category already present in `stored`; take the rest from `derived`.
pub fn fill_missing(
    stored: &ConsolidatedSpecification,
    derived: ConsolidatedSpecification,
) -> ConsolidatedSpecification {
    ConsolidatedSpecification {
        processor: stored.processor.clone().or(derived.processor),
        memory: stored.memory.clone().or(derived.memory),
        storage: stored.storage.clone().or(derived.storage),
        network: stored.network.clone().or(derived.network),
    }
}

#[derive(Default)]
struct MemoryTotals {
    contributed: bool,
    total_gb: Decimal,
    modules: u32,
    module_sizes: BTreeSet<Decimal>,
    unknown_module_size: bool,
    memory_type: Option<String>,
    speed: Option<String>,
    form_factor: Option<String>,
}

impl MemoryTotals {
    fn add(&mut self, m: &MemoryFragment, qty: u32) {
        let module_capacity = m.module_capacity.as_deref().and_then(parse_capacity_gb);
        let single = m.capacity.as_deref().and_then(parse_capacity_gb);
        let total = m.total_capacity.as_deref().and_then(parse_capacity_gb);

        let (per_unit_gb, per_unit_modules, module_size) = match (m.module_count, module_capacity, single, total) {
            (Some(n), Some(size), _, _) => (size.saturating_mul(Decimal::from(n)), n, Some(size)),
            (_, _, Some(size), _) => (size, 1, Some(size)),
            (Some(n), None, None, Some(total)) if n > 0 => (total, n, Some(total / Decimal::from(n))),
            (_, _, None, Some(total)) => (total, 0, None),
            _ => return,
        };

        self.contributed = true;
        // Absurd spreadsheet quantities saturate instead of overflowing
        self.total_gb = self.total_gb.saturating_add(per_unit_gb.saturating_mul(Decimal::from(qty)));
        self.modules = self.modules.saturating_add(per_unit_modules.saturating_mul(qty));
        match module_size {
            Some(size) => {
                self.module_sizes.insert(size.normalize());
            }
            None => self.unknown_module_size = true,
        }

        if self.memory_type.is_none() {
            self.memory_type = m.memory_type.clone();
        }
        if self.speed.is_none() {
            self.speed = m.speed.clone();
        }
        if self.form_factor.is_none() {
            self.form_factor = m.form_factor.clone();
        }
    }

    fn finish(self) -> Option<MemorySpec> {
        if !self.contributed {
            return None;
        }
        let module_capacity = match (self.unknown_module_size, self.module_sizes.len()) {
            (false, 1) => self.module_sizes.iter().next().map(|size| format_capacity_gb(*size)),
            _ => None,
        };
        Some(MemorySpec {
            total_capacity: format_capacity_gb(self.total_gb),
            module_count: self.modules,
            module_capacity,
            memory_type: self.memory_type,
            speed: self.speed,
            form_factor: self.form_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::extractor::SpecRules;
    use crate::models::catalog::Category;
    use pretty_assertions::assert_eq;

    fn fragments(items: &[(Category, &str)]) -> Vec<SpecFragment> {
        let rules = SpecRules::generic();
        items.iter().map(|(c, d)| rules.extract(*c, d)).collect()
    }

    #[test]
    fn test_dell_lot_aggregation() {
        let frags = fragments(&[
            (Category::Processor, "1 x 4309Y"),
            (Category::Memory, "32GB (2x 16GB)"),
            (Category::Storage, "8 x 2.5\""),
        ]);
        let lines: Vec<_> = frags.iter().map(|f| SpecLine::new(f, 1)).collect();
        let spec = aggregate(&lines);

        let processor = spec.processor.unwrap();
        assert_eq!(processor.count, 1);
        assert_eq!(processor.model, "4309Y");

        let memory = spec.memory.unwrap();
        assert_eq!(memory.total_capacity, "32GB");
        assert_eq!(memory.module_count, 2);
        assert_eq!(memory.module_capacity.as_deref(), Some("16GB"));

        assert_eq!(
            spec.storage.unwrap().slots,
            vec![StorageSlot {
                count: 8,
                size: Some("2.5\"".to_string()),
                interface: None,
                capacity: None,
            }]
        );
        assert!(spec.network.is_none());
    }

    #[test]
    fn test_memory_is_additive_and_quantity_aware() {
        let frags = fragments(&[
            (Category::Memory, "ThinkSystem 32GB TruDDR5 4800MHz (2Rx8) RDIMM"),
            (Category::Memory, "ThinkSystem 64GB TruDDR5 4800MHz (2Rx4) RDIMM"),
        ]);
        let lines = [SpecLine::new(&frags[0], 4), SpecLine::new(&frags[1], 2)];
        let memory = aggregate(&lines).memory.unwrap();

        assert_eq!(memory.total_capacity, "256GB");
        assert_eq!(memory.module_count, 6);
        assert_eq!(memory.module_capacity, None);
        assert_eq!(memory.memory_type.as_deref(), Some("DDR5"));
        assert_eq!(memory.speed.as_deref(), Some("4800MHz"));
    }

    #[test]
    fn test_processor_count_falls_back_to_quantity() {
        let frags = fragments(&[
            (Category::Processor, "1 x 4309Y"),
            (Category::Processor, "Intel Xeon Gold 6430 32C 270W 2.1GHz"),
        ]);
        let lines = [SpecLine::new(&frags[0], 1), SpecLine::new(&frags[1], 2)];
        let processor = aggregate(&lines).processor.unwrap();
        assert_eq!(processor.model, "6430");
        assert_eq!(processor.count, 2);
        assert_eq!(processor.cores, Some(32));
    }

    #[test]
    fn test_network_merges_by_speed() {
        let frags = fragments(&[
            (Category::Network, "Broadcom 5720 Dual Port 1GbE LOM"),
            (Category::Network, "Intel Quad Port 1GbE BASE-T"),
            (Category::Network, "2 x 25GbE SFP28"),
        ]);
        let lines: Vec<_> = frags.iter().map(|f| SpecLine::new(f, 1)).collect();
        let ports = aggregate(&lines).network.unwrap().ports;
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].count, 6);
        assert_eq!(ports[0].port_type.as_deref(), Some("BASE-T"));
        assert_eq!(ports[1].speed.as_deref(), Some("25GbE"));
    }

    #[test]
    fn test_storage_drives_and_raid() {
        let frags = fragments(&[
            (Category::Storage, "PERC H755 Front"),
            (Category::Storage, "960GB SSD SATA Read Intensive 2.5in"),
            (Category::Storage, "HBA355i"),
        ]);
        let lines = [
            SpecLine::new(&frags[0], 1),
            SpecLine::new(&frags[1], 4),
            SpecLine::new(&frags[2], 1),
        ];
        let storage = aggregate(&lines).storage.unwrap();
        assert_eq!(storage.raid_controller.as_deref(), Some("HBA355i"));
        assert_eq!(storage.slots.len(), 1);
        assert_eq!(storage.slots[0].count, 4);
        assert_eq!(storage.slots[0].capacity.as_deref(), Some("960GB"));
    }

    #[test]
    fn test_populated_lines_aggregate_idempotently() {
        let frags = fragments(&[
            (Category::Processor, "Intel Xeon Gold 6430 32C 270W 2.1GHz"),
            (Category::Memory, "ThinkSystem 32GB TruDDR5 4800MHz (2Rx8) RDIMM"),
            (Category::Storage, "8 x 2.5\""),
            (Category::Storage, "960GB SSD SATA Read Intensive 2.5in"),
            (Category::Network, "2 x 25GbE SFP28"),
            (Category::Network, "Broadcom 5720 Dual Port 1GbE LOM"),
        ]);
        let lines: Vec<_> = frags.iter().map(|f| SpecLine::new(f, 2)).collect();
        let first = aggregate(&lines);

        assert!(first.processor.is_some());
        assert!(first.memory.is_some());
        assert_eq!(first.storage.as_ref().map(|s| s.slots.len()), Some(2));
        assert_eq!(first.network.as_ref().map(|n| n.ports.len()), Some(2));
        assert_eq!(first, aggregate(&lines));
    }

    #[test]
    fn test_huge_quantities_saturate() {
        use crate::models::spec::{NetworkFragment, StorageFragment};

        let storage = SpecFragment::Storage(StorageFragment {
            slot_count: Some(100_000),
            raw: "100000 x 2.5\"".to_string(),
            ..Default::default()
        });
        let network = SpecFragment::Network(NetworkFragment {
            port_count: Some(u32::MAX),
            speed: Some("25GbE".to_string()),
            raw: "ports".to_string(),
            ..Default::default()
        });
        let memory = SpecFragment::Memory(MemoryFragment {
            module_count: Some(u32::MAX),
            module_capacity: Some("64GB".to_string()),
            raw: "memory".to_string(),
            ..Default::default()
        });
        let lines = [
            SpecLine::new(&storage, 100_000),
            SpecLine::new(&network, 2),
            SpecLine::new(&network, 2),
            SpecLine::new(&memory, u32::MAX),
        ];
        let spec = aggregate(&lines);

        assert_eq!(spec.storage.unwrap().slots[0].count, u32::MAX);
        let ports = spec.network.unwrap().ports;
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].count, u32::MAX);
        assert_eq!(spec.memory.unwrap().module_count, u32::MAX);
    }

    #[test]
    fn test_unparsed_contributes_nothing_and_is_idempotent() {
        let frags = fragments(&[
            (Category::Memory, "Memory as configured"),
            (Category::Service, "ProSupport 3 years"),
        ]);
        let lines: Vec<_> = frags.iter().map(|f| SpecLine::new(f, 1)).collect();
        let first = aggregate(&lines);
        assert!(first.is_empty());
        assert_eq!(first, aggregate(&lines));
    }

    #[test]
    fn test_fill_missing_keeps_stored_categories() {
        let stored = ConsolidatedSpecification {
            processor: Some(ProcessorSpec {
                count: 2,
                model: "6430".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let derived = ConsolidatedSpecification {
            processor: Some(ProcessorSpec {
                count: 1,
                model: "4309Y".to_string(),
                ..Default::default()
            }),
            memory: Some(MemorySpec {
                total_capacity: "32GB".to_string(),
                module_count: 2,
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = fill_missing(&stored, derived);
        assert_eq!(merged.processor.unwrap().model, "6430");
        assert_eq!(merged.memory.unwrap().total_capacity, "32GB");
    }
}
