//! Read-time inference over a stored model's extension records.

use tracing::debug;

use crate::models::catalog::Extension;
use crate::models::spec::{ConsolidatedSpecification, SpecFragment};

use super::aggregator::{aggregate, fill_missing, SpecLine};
use super::InferenceRules;

/// Label and description text an extension is classified on.
fn extension_text(ext: &Extension) -> (String, String) {
    let label = [ext.category.as_deref(), ext.kind.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    // Size goes first so "RDIMM" + "32GB" reads as "32GB RDIMM"
    let name = ext.name.trim();
    let lower = name.to_lowercase();
    let description = [
        unseen(ext.size.as_deref(), &lower),
        Some(name),
        unseen(ext.speed.as_deref(), &lower),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
    (label, description)
}

/// `extra` unless the name already mentions it.
fn unseen<'a>(extra: Option<&'a str>, name_lower: &str) -> Option<&'a str> {
    extra
        .map(str::trim)
        .filter(|e| !e.is_empty() && !name_lower.contains(&e.to_lowercase()))
}

/// Classify, extract and aggregate extension records into a specification.
pub fn infer_from_extensions(
    rules: &InferenceRules,
    extensions: &[Extension],
) -> ConsolidatedSpecification {
    let fragments: Vec<(SpecFragment, u32)> = extensions
        .iter()
        .map(|ext| {
            let (label, description) = extension_text(ext);
            let (_, fragment) = rules.infer_line(&label, &description);
            (fragment, ext.quantity.unwrap_or(1).max(1))
        })
        .collect();

    let lines: Vec<SpecLine<'_>> = fragments
        .iter()
        .map(|(fragment, qty)| SpecLine::new(fragment, *qty))
        .collect();
    aggregate(&lines)
}

/// Fill only the categories missing from `stored` with values inferred from
/// `extensions`. Categories already present are returned unchanged.
pub fn augment_specification(
    rules: &InferenceRules,
    stored: &ConsolidatedSpecification,
    extensions: &[Extension],
) -> ConsolidatedSpecification {
    if extensions.is_empty() || stored.missing_categories().is_empty() {
        return stored.clone();
    }
    let derived = infer_from_extensions(rules, extensions);
    debug!(
        "Inferring {:?} from {} extension records",
        stored.missing_categories(),
        extensions.len()
    );
    fill_missing(stored, derived)
}
