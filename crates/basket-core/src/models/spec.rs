//! Specification payloads: per-line fragments and the consolidated per-model view.

use serde::{Deserialize, Serialize};

use super::catalog::Category;

/// Structured result of extracting one line item's description.
///
/// Every variant keeps the source text in `raw`, so callers never need to
/// guess a payload's shape from a category string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecFragment {
    Processor(ProcessorFragment),
    Memory(MemoryFragment),
    Storage(StorageFragment),
    Network(NetworkFragment),
    /// No pattern matched; the text is kept as-is.
    Unparsed {
        #[serde(rename = "type")]
        category: Category,
        raw: String,
    },
}

impl SpecFragment {
    pub fn unparsed(category: Category, raw: impl Into<String>) -> Self {
        SpecFragment::Unparsed {
            category,
            raw: raw.into(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            SpecFragment::Processor(f) => &f.raw,
            SpecFragment::Memory(f) => &f.raw,
            SpecFragment::Storage(f) => &f.raw,
            SpecFragment::Network(f) => &f.raw,
            SpecFragment::Unparsed { raw, .. } => raw,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, SpecFragment::Unparsed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    /// Thermal design power in watts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdp: Option<u32>,
    /// Normalized as `"<n>GHz"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_frequency: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_capacity: Option<String>,
    /// Capacity of a single module when the text names only one size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raid_controller: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_count: Option<u32>,
    /// Normalized as `"<n>GbE"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    pub raw: String,
}

/// Merged specification of one model. Absent categories stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<ProcessorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemorySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSpec>,
}

impl ConsolidatedSpecification {
    pub fn is_empty(&self) -> bool {
        self.processor.is_none()
            && self.memory.is_none()
            && self.storage.is_none()
            && self.network.is_none()
    }

    /// Categories with no consolidated value yet.
    pub fn missing_categories(&self) -> Vec<Category> {
        let mut missing = Vec::new();
        if self.processor.is_none() {
            missing.push(Category::Processor);
        }
        if self.memory.is_none() {
            missing.push(Category::Memory);
        }
        if self.storage.is_none() {
            missing.push(Category::Storage);
        }
        if self.network.is_none() {
            missing.push(Category::Network);
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    pub count: u32,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdp: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySpec {
    pub total_capacity: String,
    pub module_count: u32,
    /// Set only when every module has the same capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_capacity: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSpec {
    #[serde(default)]
    pub slots: Vec<StorageSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raid_controller: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSlot {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub ports: Vec<NetworkPortGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPortGroup {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsed_serializes_type_and_raw() {
        let fragment = SpecFragment::unparsed(Category::Service, "3Yr ProSupport");
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["kind"], "unparsed");
        assert_eq!(json["type"], "service");
        assert_eq!(json["raw"], "3Yr ProSupport");
    }

    #[test]
    fn test_absent_categories_are_omitted() {
        let spec = ConsolidatedSpecification {
            memory: Some(MemorySpec {
                total_capacity: "32GB".to_string(),
                module_count: 2,
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert!(json.get("processor").is_none());
        assert_eq!(json["memory"]["module_count"], 2);
        assert_eq!(
            spec.missing_categories(),
            vec![Category::Processor, Category::Storage, Category::Network]
        );
    }
}
