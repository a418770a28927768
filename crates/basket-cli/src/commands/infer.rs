//! Infer command - fill a stored model's missing specification from extension records.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use serde_json::Value;
use tracing::info;

use basket_core::{augment_specification, ConsolidatedSpecification, Extension, InferenceRules};

/// Arguments for the infer command.
#[derive(Args)]
pub struct InferArgs {
    /// Model JSON: a parsed model record or a bare specification
    #[arg(short, long)]
    model: PathBuf,

    /// Extensions JSON: an array of extension records
    #[arg(short, long)]
    extensions: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: InferArgs) -> anyhow::Result<()> {
    let model: Value = read_json(&args.model)?;
    let extensions: Vec<Extension> = serde_json::from_value(read_json(&args.extensions)?)
        .with_context(|| format!("{} is not an array of extension records", args.extensions.display()))?;

    // A model record carries its specification under "specification"
    let (mut document, spec_value) = match model.get("specification") {
        Some(spec) => (Some(model.clone()), spec.clone()),
        None => (None, model),
    };
    let stored: ConsolidatedSpecification = serde_json::from_value(spec_value)
        .with_context(|| format!("{} does not contain a specification", args.model.display()))?;

    let missing = stored.missing_categories();
    let augmented = augment_specification(&InferenceRules::generic(), &stored, &extensions);
    let still_missing = augmented.missing_categories();
    let filled: Vec<_> = missing
        .iter()
        .filter(|c| !still_missing.contains(c))
        .map(|c| c.to_string())
        .collect();
    info!("Filled {} categories from {} extensions", filled.len(), extensions.len());

    let result = match document.as_mut() {
        Some(doc) => {
            doc["specification"] = serde_json::to_value(&augmented)?;
            serde_json::to_string_pretty(doc)?
        }
        None => serde_json::to_string_pretty(&augmented)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &result)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", result);
    }

    if filled.is_empty() {
        eprintln!("{} No categories filled", style("ℹ").blue());
    } else {
        eprintln!("{} Filled: {}", style("✓").green(), filled.join(", "));
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}
