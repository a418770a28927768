//! Keyword-table classification of line items into component categories.

use serde::{Deserialize, Serialize};

use crate::models::catalog::Category;

/// Which text a keyword rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchScope {
    Label,
    Description,
    Any,
}

/// A case-insensitive substring rule. Matches when any keyword is found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub scope: MatchScope,
    /// Lower-case keywords.
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: Category, scope: MatchScope, keywords: &[&str]) -> Self {
        Self {
            category,
            scope,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, label: &str, description: &str) -> bool {
        let hit = |text: &str| self.keywords.iter().any(|k| text.contains(k.as_str()));
        match self.scope {
            MatchScope::Label => hit(label),
            MatchScope::Description => hit(description),
            MatchScope::Any => hit(label) || hit(description),
        }
    }
}

/// Ordered rule table; the first matching rule decides the category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub rules: Vec<KeywordRule>,
    pub default: Category,
}

impl ClassifierRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            default: Category::Software,
        }
    }

    /// Label-driven table for quotes with an item column ("Processor",
    /// "RAM (Capacity)", "Boot Disk", "# of NIC ports & type").
    pub fn dell() -> Self {
        use Category::*;
        use MatchScope::Label;

        let mut rules = vec![
            KeywordRule::new(BaseServer, Label, &["base system", "base model", "platform", "server model"]),
            KeywordRule::new(Processor, Label, &["processor", "cpu"]),
            KeywordRule::new(Memory, Label, &["ram", "memory", "dimm"]),
            KeywordRule::new(
                Storage,
                Label,
                &["disk", "drive", "storage", "raid", "controller", "backplane", "chassis", "boss"],
            ),
            KeywordRule::new(Network, Label, &["nic", "network", "ethernet", "lom", "ocp"]),
            KeywordRule::new(
                Expansion,
                Label,
                &["riser", "pcie", "gpu", "power supply", "psu", "fan", "rail", "bezel"],
            ),
            KeywordRule::new(Service, Label, &["support", "warranty", "service", "deployment", "installation"]),
            KeywordRule::new(Software, Label, &["operating system", "license", "idrac", "software"]),
        ];
        rules.extend(Self::generic().rules);
        Self::new(rules)
    }

    /// Description-driven table for part-number catalogs
    /// ("ThinkSystem 32GB TruDDR5 4800MHz (2Rx8) RDIMM").
    pub fn lenovo() -> Self {
        use Category::*;
        use MatchScope::Description;

        Self::new(vec![
            KeywordRule::new(Processor, Description, &["xeon", "epyc", "processor"]),
            KeywordRule::new(Memory, Description, &["truddr", "rdimm", "udimm", "dimm", "memory"]),
            KeywordRule::new(
                Storage,
                Description,
                &[
                    "raid", "hba", "ssd", "hdd", "nvme", "backplane", "bays", "m.2", "sata", "sas ",
                    "storage",
                ],
            ),
            KeywordRule::new(Network, Description, &["ethernet", "gbe", "sfp", "network", "nic"]),
            KeywordRule::new(Service, Description, &["warranty", "support", "premier", "service", "installation"]),
            KeywordRule::new(Software, Description, &["license", "xclarity", "vmware", "windows", "software"]),
            KeywordRule::new(
                Expansion,
                Description,
                &["riser", "pcie", "power supply", "fan", "rail", "bezel", "gpu", "cable", "heatsink"],
            ),
            KeywordRule::new(
                BaseServer,
                Description,
                &["thinksystem sr", "thinksystem st", "thinkagile", "chassis", " mb", "base"],
            ),
        ])
    }

    /// Vendor-agnostic table, used for extension records.
    pub fn generic() -> Self {
        use Category::*;
        use MatchScope::Any;

        Self::new(vec![
            KeywordRule::new(Processor, Any, &["processor", "cpu", "xeon", "epyc"]),
            KeywordRule::new(Memory, Any, &["memory", "ram", "dimm", "ddr"]),
            KeywordRule::new(
                Storage,
                Any,
                &[
                    "storage", "disk", "drive", "ssd", "hdd", "nvme", "raid", "perc", "hba", "boss",
                    "backplane",
                ],
            ),
            KeywordRule::new(Network, Any, &["network", "nic", "ethernet", "gbe", "sfp"]),
            KeywordRule::new(
                Expansion,
                Any,
                &["riser", "pcie", "gpu", "power supply", "psu", "fan", "expansion"],
            ),
            KeywordRule::new(Service, Any, &["support", "warranty", "service"]),
            KeywordRule::new(Software, Any, &["license", "software"]),
            KeywordRule::new(BaseServer, Any, &["server", "chassis", "base"]),
        ])
    }

    /// Category of a line item. Total: unmatched text gets the default.
    pub fn classify(&self, label: &str, description: &str) -> Category {
        let label = label.to_lowercase();
        let description = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&label, &description))
            .map(|rule| rule.category)
            .unwrap_or(self.default)
    }
}
