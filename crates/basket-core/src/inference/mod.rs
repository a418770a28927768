//! Classify → extract → aggregate, shared by row parsing and read-time inference.

pub mod aggregator;
pub mod classifier;
pub mod extensions;
pub mod extractor;
pub mod rules;

pub use aggregator::{aggregate, fill_missing, SpecLine};
pub use classifier::{ClassifierRules, KeywordRule, MatchScope};
pub use extensions::{augment_specification, infer_from_extensions};
pub use extractor::{PatternRule, SpecRules};

use crate::models::catalog::Category;
use crate::models::spec::SpecFragment;

/// Classifier and pattern tables used together for one vendor or source.
#[derive(Debug, Clone)]
pub struct InferenceRules {
    pub classifier: ClassifierRules,
    pub specs: SpecRules,
}

impl InferenceRules {
    pub fn new(classifier: ClassifierRules, specs: SpecRules) -> Self {
        Self { classifier, specs }
    }

    /// Vendor-agnostic tables.
    pub fn generic() -> Self {
        Self::new(ClassifierRules::generic(), SpecRules::generic())
    }

    /// Category and specification fragment for one line item.
    pub fn infer_line(&self, label: &str, description: &str) -> (Category, SpecFragment) {
        let category = self.classifier.classify(label, description);
        let fragment = self.specs.extract(category, description);
        (category, fragment)
    }
}

impl Default for InferenceRules {
    fn default() -> Self {
        Self::generic()
    }
}
