//! Process command - normalize a single basket file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use basket_core::models::spec::ConsolidatedSpecification;
use basket_core::{BasketMeta, BasketParser, Diagnostics, ParseOutcome, Severity};

use crate::workbook;

/// Basket identification shared by `process` and `batch`.
#[derive(Args, Clone, Debug)]
pub struct MetaArgs {
    /// Vendor name (detected from sheet names when omitted)
    #[arg(long)]
    pub vendor: Option<String>,

    /// Quote quarter, e.g. "Q3" or "3"
    #[arg(long, value_parser = parse_quarter, requires = "year")]
    pub quarter: Option<u8>,

    /// Quote year
    #[arg(long)]
    pub year: Option<i32>,

    /// Free-form revision tag
    #[arg(long)]
    pub revision: Option<String>,

    /// Date prices become valid (YYYY-MM-DD), overriding the quarter start
    #[arg(long)]
    pub valid_from: Option<NaiveDate>,
}

impl MetaArgs {
    pub fn meta_for(&self, path: &Path) -> BasketMeta {
        let mut meta = BasketMeta::new(self.vendor.clone().unwrap_or_default());
        if let (Some(quarter), Some(year)) = (self.quarter, self.year) {
            meta = meta.with_period(quarter, year);
        } else {
            meta.year = self.year;
        }
        if let Some(revision) = &self.revision {
            meta = meta.with_revision(revision.clone());
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            meta = meta.with_filename(name);
        }
        meta.valid_from = self.valid_from;
        meta
    }
}

fn parse_quarter(value: &str) -> Result<u8, String> {
    let digits = value.trim().trim_start_matches(['Q', 'q']);
    match digits.parse::<u8>() {
        Ok(q @ 1..=4) => Ok(q),
        _ => Err(format!("invalid quarter '{}', expected Q1-Q4", value)),
    }
}

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.xlsx, .xls, .ods or a JSON cell grid)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    meta: MetaArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print parse diagnostics
    #[arg(long)]
    show_diagnostics: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (full parse outcome)
    Json,
    /// CSV output, one row per model
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::resolve(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Loading workbook...");
    let workbook = workbook::load(&args.input)?;
    debug!("Sheets: {:?}", workbook.sheet_names());

    pb.set_message("Parsing lots...");
    let parser = BasketParser::new(config);
    let outcome = parser.parse(&workbook, &args.meta.meta_for(&args.input))?;

    pb.finish_and_clear();

    let output = format_outcome(&outcome, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_diagnostics {
        print_diagnostics(&outcome.diagnostics);
    } else if !outcome.diagnostics.is_empty() {
        eprintln!(
            "{} {} diagnostics (use --show-diagnostics to list them)",
            style("ℹ").blue(),
            outcome.diagnostics.len()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if outcome.diagnostics.has_errors() {
        anyhow::bail!("Basket {} could not be parsed", args.input.display());
    }
    Ok(())
}

pub fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        eprintln!("{} No diagnostics", style("✓").green());
        return;
    }
    eprintln!("{}", style("Diagnostics:").yellow());
    for diagnostic in diagnostics {
        let glyph = match diagnostic.severity {
            Severity::Error => style("✗").red(),
            Severity::Warning => style("⚠").yellow(),
            Severity::Info => style("ℹ").blue(),
        };
        eprintln!(
            "  {} {} ({}): {}",
            glyph, diagnostic.kind, diagnostic.location, diagnostic.message
        );
    }
}

pub fn format_outcome(outcome: &ParseOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => format_csv(outcome),
        OutputFormat::Text => Ok(format_text(outcome)),
    }
}

fn format_csv(outcome: &ParseOutcome) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "model_id",
        "vendor",
        "lot_description",
        "model_name",
        "model_number",
        "form_factor",
        "processor",
        "memory",
        "storage",
        "network",
        "configurations",
        "currency",
        "list_price",
        "net_price_usd",
        "net_price_eur",
    ])?;

    for model in &outcome.models {
        let pricing = outcome.pricing_of(&model.id);
        let spec = describe_spec(&model.specification);
        let price = |currency: &str| {
            pricing
                .and_then(|p| p.net_price(currency))
                .map(|d| d.to_string())
                .unwrap_or_default()
        };
        let configurations = outcome.configurations_of(&model.id).count().to_string();
        let list_price = pricing
            .and_then(|p| p.list_price)
            .map(|d| d.to_string())
            .unwrap_or_default();
        let (usd, eur) = (price("USD"), price("EUR"));

        wtr.write_record([
            model.id.as_str(),
            model.vendor_id.as_str(),
            model.lot_description.as_str(),
            model.model_name.as_str(),
            model.model_number.as_deref().unwrap_or(""),
            model.form_factor.as_deref().unwrap_or(""),
            spec.processor.as_str(),
            spec.memory.as_str(),
            spec.storage.as_str(),
            spec.network.as_str(),
            configurations.as_str(),
            pricing.map(|p| p.currency.as_str()).unwrap_or(""),
            list_price.as_str(),
            usd.as_str(),
            eur.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcome: &ParseOutcome) -> String {
    let mut output = String::new();
    let basket = &outcome.basket;

    output.push_str(&format!("Basket: {} ({})\n", basket.id, basket.vendor));
    if let Some(revision) = &basket.revision {
        output.push_str(&format!("Revision: {}\n", revision));
    }
    if let Some(filename) = &basket.filename {
        output.push_str(&format!("File: {}\n", filename));
    }
    output.push_str(&format!(
        "Models: {}, configurations: {}, options: {}\n",
        outcome.models.len(),
        outcome.configurations.len(),
        outcome.options.len()
    ));

    for model in &outcome.models {
        output.push('\n');
        output.push_str(&format!("{}\n", model.lot_description));
        if let Some(number) = &model.model_number {
            output.push_str(&format!("  Model: {}", number));
            if let Some(ff) = &model.form_factor {
                output.push_str(&format!(" ({})", ff));
            }
            output.push('\n');
        }

        let spec = describe_spec(&model.specification);
        for (label, value) in [
            ("CPU", &spec.processor),
            ("Memory", &spec.memory),
            ("Storage", &spec.storage),
            ("Network", &spec.network),
        ] {
            if !value.is_empty() {
                output.push_str(&format!("  {:<8} {}\n", format!("{}:", label), value));
            }
        }

        if let Some(pricing) = outcome.pricing_of(&model.id) {
            for (currency, price) in &pricing.net_prices {
                output.push_str(&format!("  Net:     {} {}\n", price, currency));
            }
            for option in &pricing.support_options {
                let prices: Vec<String> = option
                    .prices
                    .iter()
                    .map(|(currency, price)| format!("{} {}", price, currency))
                    .collect();
                output.push_str(&format!(
                    "  Support: {}y {}: {}\n",
                    option.duration_years,
                    option.tier,
                    prices.join(", ")
                ));
            }
        }
    }

    output
}

/// One-line summaries of each consolidated spec category.
#[derive(Default)]
pub struct SpecSummary {
    pub processor: String,
    pub memory: String,
    pub storage: String,
    pub network: String,
}

pub fn describe_spec(spec: &ConsolidatedSpecification) -> SpecSummary {
    let mut summary = SpecSummary::default();

    if let Some(p) = &spec.processor {
        let mut parts = vec![format!("{} x {}", p.count, p.model)];
        if let Some(cores) = p.cores {
            parts.push(format!("{}C", cores));
        }
        if let Some(freq) = &p.base_frequency {
            parts.push(freq.clone());
        }
        if let Some(tdp) = p.tdp {
            parts.push(format!("{}W", tdp));
        }
        summary.processor = parts.join(" ");
    }

    if let Some(m) = &spec.memory {
        let mut parts = vec![m.total_capacity.clone()];
        if let Some(module) = &m.module_capacity {
            parts.push(format!("({} x {})", m.module_count, module));
        }
        parts.extend(m.memory_type.iter().cloned());
        summary.memory = parts.join(" ");
    }

    if let Some(s) = &spec.storage {
        let mut slots: Vec<String> = s
            .slots
            .iter()
            .map(|slot| {
                let what = slot
                    .capacity
                    .as_deref()
                    .or(slot.size.as_deref())
                    .unwrap_or("slot");
                format!("{} x {}", slot.count, what)
            })
            .collect();
        slots.extend(s.raid_controller.iter().cloned());
        summary.storage = slots.join(", ");
    }

    if let Some(n) = &spec.network {
        summary.network = n
            .ports
            .iter()
            .map(|g| {
                let mut text = format!("{} x {}", g.count, g.speed.as_deref().unwrap_or("?"));
                if let Some(t) = &g.port_type {
                    text.push(' ');
                    text.push_str(t);
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ");
    }

    summary
}
