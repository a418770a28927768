//! Basket parser: drives layout resolution, segmentation, inference and
//! pricing over one workbook.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::error::{BasketError, Result};
use crate::inference::aggregator::{aggregate, SpecLine};
use crate::models::catalog::{Basket, BasketMeta, CatalogOption, Configuration, Model, Pricing};
use crate::models::config::BasketConfig;
use crate::models::grid::{Sheet, Workbook};

use super::columns::{resolve_layout, ColumnLayout, LayoutSource};
use super::identity::identify;
use super::options::extract_options;
use super::pricing::{extract_pricing, PricingContext};
use super::segmenter::{LotSegmenter, SegmentedLot};
use super::vendor::{detect, VendorProfile};

/// Everything one ingestion run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub basket: Basket,
    pub models: Vec<Model>,
    pub configurations: Vec<Configuration>,
    pub pricing: Vec<Pricing>,
    pub options: Vec<CatalogOption>,
    pub diagnostics: Diagnostics,
}

impl ParseOutcome {
    /// Configurations of one model, in source order.
    pub fn configurations_of<'a>(&'a self, model_id: &'a str) -> impl Iterator<Item = &'a Configuration> + 'a {
        self.configurations.iter().filter(move |c| c.model_id == model_id)
    }

    pub fn pricing_of(&self, model_id: &str) -> Option<&Pricing> {
        self.pricing.iter().find(|p| p.model_id == model_id)
    }

    pub fn model_by_lot(&self, lot_description: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.lot_description == lot_description)
    }
}

/// Hardware basket parser.
///
/// Holds no mutable state; one instance can parse many workbooks from many
/// threads.
#[derive(Debug, Clone)]
pub struct BasketParser {
    config: BasketConfig,
    profiles: Vec<VendorProfile>,
}

impl BasketParser {
    /// Create a parser with the built-in vendor profiles.
    pub fn new(config: BasketConfig) -> Self {
        Self {
            config,
            profiles: VendorProfile::builtin(),
        }
    }

    /// Register a profile. A profile with the same id replaces the existing one.
    pub fn with_profile(mut self, profile: VendorProfile) -> Self {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        self
    }

    /// Look up the profile for a vendor name or alias.
    pub fn profile_for(&self, vendor: &str) -> Result<&VendorProfile> {
        self.profiles
            .iter()
            .find(|p| p.matches(vendor))
            .ok_or_else(|| BasketError::UnsupportedVendor(vendor.to_string()))
    }

    /// Guess the vendor from the workbook's sheet names.
    pub fn detect_vendor(&self, workbook: &Workbook) -> Option<&VendorProfile> {
        detect(workbook, &self.profiles)
    }

    /// Parse one workbook.
    ///
    /// Returns `Err` only for an unknown vendor or a workbook that breaks its
    /// shape contract. Everything wrong with the data itself ends up in
    /// `ParseOutcome::diagnostics`.
    pub fn parse(&self, workbook: &Workbook, meta: &BasketMeta) -> Result<ParseOutcome> {
        workbook.validate()?;

        let profile = if meta.vendor.trim().is_empty() {
            self.detect_vendor(workbook).ok_or_else(|| {
                BasketError::UnsupportedVendor(format!(
                    "cannot detect vendor from sheets {:?}",
                    workbook.sheet_names()
                ))
            })?
        } else {
            self.profile_for(&meta.vendor)?
        };

        info!("Parsing {} basket with {} sheets", profile.display_name, workbook.sheets.len());

        let basket = Basket {
            id: meta
                .basket_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            vendor: profile.id.clone(),
            revision: meta.revision_tag(),
            filename: meta.filename.clone(),
            uploaded_at: Utc::now(),
        };

        let mut run = Run::new(&self.config, profile, meta, basket.id.clone());

        match self.lot_sheet(workbook, profile) {
            Some(sheet) => run.parse_lot_sheet(sheet),
            None => {
                run.diagnostics.error(
                    DiagnosticKind::MissingRequiredSheet,
                    Location::default(),
                    format!(
                        "no lot sheet for {} (looked for {:?}, found {:?})",
                        profile.display_name,
                        profile.lot_sheets,
                        workbook.sheet_names()
                    ),
                );
                return Ok(run.finish(basket));
            }
        }

        if self.config.parse.include_options {
            if let Some(sheet) = workbook.find_sheet(&profile.options_sheets) {
                run.parse_options_sheet(sheet);
            }
        }

        let outcome = run.finish(basket);
        info!(
            "Parsed basket {}: {} models, {} configurations, {} pricing records, {} options, {} diagnostics",
            outcome.basket.id,
            outcome.models.len(),
            outcome.configurations.len(),
            outcome.pricing.len(),
            outcome.options.len(),
            outcome.diagnostics.len()
        );
        Ok(outcome)
    }

    fn lot_sheet<'w>(&self, workbook: &'w Workbook, profile: &VendorProfile) -> Option<&'w Sheet> {
        let preferred = self
            .config
            .vendor_override(&profile.id)
            .and_then(|o| o.lot_sheet.clone());
        preferred
            .and_then(|name| workbook.find_sheet(&[name]))
            .or_else(|| workbook.find_sheet(&profile.lot_sheets))
    }
}

impl Default for BasketParser {
    fn default() -> Self {
        Self::new(BasketConfig::default())
    }
}

/// Accumulated state of one `parse` call.
struct Run<'a> {
    config: &'a BasketConfig,
    profile: &'a VendorProfile,
    meta: &'a BasketMeta,
    basket_id: String,
    models: Vec<Model>,
    configurations: Vec<Configuration>,
    pricing: Vec<Pricing>,
    options: Vec<CatalogOption>,
    diagnostics: Diagnostics,
    seen_lots: HashSet<String>,
}

impl<'a> Run<'a> {
    fn new(config: &'a BasketConfig, profile: &'a VendorProfile, meta: &'a BasketMeta, basket_id: String) -> Self {
        Self {
            config,
            profile,
            meta,
            basket_id,
            models: Vec::new(),
            configurations: Vec::new(),
            pricing: Vec::new(),
            options: Vec::new(),
            diagnostics: Diagnostics::new(),
            seen_lots: HashSet::new(),
        }
    }

    fn fixed_layout(&self) -> ColumnLayout {
        let mut fixed = self.profile.fixed_layout.clone();
        if let Some(row) = self
            .config
            .vendor_override(&self.profile.id)
            .and_then(|o| o.header_row)
        {
            fixed.header_row = row;
        }
        fixed
    }

    fn parse_lot_sheet(&mut self, sheet: &Sheet) {
        let fixed = self.fixed_layout();
        let (layout, source) = resolve_layout(
            &sheet.rows,
            &self.profile.headers,
            &fixed,
            self.config.parse.header_scan_rows,
            &self.config.pricing.default_currency,
            self.config.pricing.allow_fixed_offsets,
        );
        debug!("Layout for '{}' resolved from {:?}: {:?}", sheet.name, source, layout);

        if source != LayoutSource::Headers && !layout.prices.is_empty() {
            self.diagnostics.warning(
                DiagnosticKind::PricingColumnFallback,
                Location::row(&sheet.name, layout.header_row),
                "price columns located by fixed offsets",
            );
        }

        let (lots, segment_diagnostics) =
            LotSegmenter::new(&layout, self.profile.boundary, &self.profile.lot_marker, &sheet.name)
                .segment(&sheet.rows);
        self.diagnostics.merge(segment_diagnostics);

        for lot in lots {
            self.add_lot(sheet, &layout, lot);
        }
    }

    /// Unique lot description: repeated headings get a " #n" suffix.
    fn unique_heading(&mut self, sheet: &str, lot: &SegmentedLot) -> String {
        if self.seen_lots.insert(lot.heading.clone()) {
            return lot.heading.clone();
        }
        // A literal heading such as "Lot A #2" may already hold a suffix slot
        let unique = (2..)
            .map(|n| format!("{} #{}", lot.heading, n))
            .find(|candidate| !self.seen_lots.contains(candidate))
            .unwrap_or_else(|| lot.heading.clone());
        self.seen_lots.insert(unique.clone());
        self.diagnostics.warning(
            DiagnosticKind::DuplicateLot,
            Location::row(sheet, lot.row),
            format!("lot '{}' appears more than once, stored as '{}'", lot.heading, unique),
        );
        unique
    }

    fn add_lot(&mut self, sheet: &Sheet, layout: &ColumnLayout, lot: SegmentedLot) {
        let lot_description = self.unique_heading(&sheet.name, &lot);
        let model_id = format!("{}/m{}", self.basket_id, self.models.len() + 1);
        let identity = identify(&lot.heading, self.profile);

        let mut configurations = Vec::with_capacity(lot.items.len());
        for (n, item) in lot.items.iter().enumerate() {
            let label = item.label.as_deref().unwrap_or("");
            let (category, specification) = self.profile.inference.infer_line(label, &item.description);

            if specification.is_unparsed() && category.has_structured_spec() && self.config.parse.warn_on_unparsed {
                self.diagnostics.warning(
                    DiagnosticKind::RowParseWarning,
                    Location::row(&sheet.name, item.row).with_field("description"),
                    format!("no {} pattern matched '{}'", category, item.description),
                );
            }

            configurations.push(Configuration {
                id: format!("{}/c{}", model_id, n + 1),
                model_id: model_id.clone(),
                part_number: item.part_number.clone(),
                label: item.label.clone(),
                description: item.description.clone(),
                category,
                quantity: item.quantity,
                specification,
                source_row: item.row + 1,
            });
        }

        let lines: Vec<SpecLine<'_>> = configurations
            .iter()
            .map(|c| SpecLine::new(&c.specification, c.quantity))
            .collect();
        let specification = aggregate(&lines);

        let ctx = PricingContext {
            sheet: &sheet.name,
            row: lot.row,
            default_currency: &self.config.pricing.default_currency,
            valid_from: self.meta.period_start(),
            heading_warranty_years: identity.warranty_years.filter(|_| self.profile.heading_warranty),
        };
        let (pricing, pricing_diagnostics) = extract_pricing(&model_id, &lot.cells, layout, &ctx);
        self.diagnostics.merge(pricing_diagnostics);

        debug!(
            "Lot '{}' -> {} with {} configurations",
            lot_description,
            model_id,
            configurations.len()
        );

        self.models.push(Model {
            id: model_id,
            basket_id: self.basket_id.clone(),
            vendor_id: self.profile.id.clone(),
            lot_description,
            lot_code: identity.lot_code,
            model_name: identity.model_name,
            model_number: identity.model_number,
            category: "server".to_string(),
            form_factor: identity.form_factor,
            specification,
            source_sheet: sheet.name.clone(),
            source_row: lot.row + 1,
        });
        self.configurations.extend(configurations);
        self.pricing.extend(pricing);
    }

    fn parse_options_sheet(&mut self, sheet: &Sheet) {
        let (options, diagnostics) = extract_options(
            sheet,
            self.profile,
            self.config.parse.header_scan_rows,
            &self.config.pricing.default_currency,
            self.config.pricing.allow_fixed_offsets,
        );
        self.options.extend(options);
        self.diagnostics.merge(diagnostics);
    }

    fn finish(self, basket: Basket) -> ParseOutcome {
        ParseOutcome {
            basket,
            models: self.models,
            configurations: self.configurations,
            pricing: self.pricing,
            options: self.options,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::Category;
    use crate::models::config::VendorOverride;
    use crate::models::grid::Cell;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn dell_sheet(name: &str) -> Sheet {
        Sheet::new(
            name,
            vec![
                row(&["Dell Quote"]),
                row(&[]),
                row(&[]),
                row(&["Lot Description", "Item", "Specification", "List Price", "Net Price USD"]),
                row(&["SMA1 - PowerEdge R660", "Processor", "2 x Intel Xeon Gold 6430 32C/64T 2.1GHz", "20000", "15000"]),
                row(&["", "Memory", "256GB (8x32GB) DDR5 4800MT/s RDIMM", "", ""]),
                row(&["SMA2 - PowerEdge R760", "Processor", "2 x Intel Xeon Gold 6430 32C/64T 2.1GHz", "", ""]),
                row(&["SMA1 - PowerEdge R660", "Processor", "1 x Intel Xeon Silver 4410Y 12C 2.0GHz", "9000", "7000"]),
            ],
        )
    }

    fn meta() -> BasketMeta {
        BasketMeta::new("dell").with_basket_id("b1").with_period(3, 2025)
    }

    #[test]
    fn test_parser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BasketParser>();
    }

    #[test]
    fn test_unknown_vendor_is_an_error() {
        let parser = BasketParser::default();
        let wb = Workbook::new(vec![dell_sheet("Dell Lot Pricing")]);
        let err = parser.parse(&wb, &BasketMeta::new("hpe")).unwrap_err();
        assert!(matches!(err, BasketError::UnsupportedVendor(_)));
    }

    #[test]
    fn test_duplicate_lot_headings_get_suffix() {
        let parser = BasketParser::default();
        let wb = Workbook::new(vec![dell_sheet("Dell Lot Pricing")]);
        let outcome = parser.parse(&wb, &meta()).unwrap();

        let lots: Vec<&str> = outcome.models.iter().map(|m| m.lot_description.as_str()).collect();
        assert_eq!(
            lots,
            vec!["SMA1 - PowerEdge R660", "SMA2 - PowerEdge R760", "SMA1 - PowerEdge R660 #2"]
        );
        assert_eq!(outcome.diagnostics.count(DiagnosticKind::DuplicateLot), 1);
        assert_eq!(outcome.models[0].id, "b1/m1");
        assert_eq!(outcome.configurations[0].id, "b1/m1/c1");
        assert_eq!(outcome.configurations[1].category, Category::Memory);
        assert_eq!(outcome.configurations_of("b1/m1").count(), 2);
        // SMA2 has no price cells
        assert_eq!(outcome.pricing.len(), 2);
        assert!(outcome.pricing_of("b1/m2").is_none());
        assert_eq!(outcome.basket.revision.as_deref(), Some("Q3 2025"));
    }

    #[test]
    fn test_suffixed_heading_does_not_collide() {
        let sheet = Sheet::new(
            "Dell Lot Pricing",
            vec![
                row(&["Lot Description", "Item", "Specification"]),
                row(&["Lot A #2", "Processor", "1 x 4309Y"]),
                row(&["Lot A", "Processor", "1 x 4309Y"]),
                row(&["Lot B", "Processor", "2 x 6430"]),
                row(&["Lot A", "Processor", "2 x 6430"]),
            ],
        );
        let outcome = BasketParser::default()
            .parse(&Workbook::new(vec![sheet]), &meta())
            .unwrap();

        let lots: Vec<&str> = outcome.models.iter().map(|m| m.lot_description.as_str()).collect();
        assert_eq!(lots, vec!["Lot A #2", "Lot A", "Lot B", "Lot A #3"]);
        assert_eq!(outcome.diagnostics.count(DiagnosticKind::DuplicateLot), 1);
    }

    #[test]
    fn test_registered_profile_handles_new_vendor() {
        let mut profile = VendorProfile::dell();
        profile.id = "hpe".to_string();
        profile.display_name = "HPE".to_string();
        profile.aliases = vec!["hewlett packard enterprise".to_string()];
        profile.lot_sheets = vec!["HPE Lots".to_string()];

        let parser = BasketParser::default().with_profile(profile);
        let wb = Workbook::new(vec![dell_sheet("HPE Lots")]);
        let outcome = parser
            .parse(&wb, &BasketMeta::new("Hewlett Packard Enterprise").with_basket_id("b1"))
            .unwrap();
        assert_eq!(outcome.basket.vendor, "hpe");
        assert_eq!(outcome.models.len(), 3);
        assert_eq!(outcome.models[0].vendor_id, "hpe");
    }

    #[test]
    fn test_sheet_override_is_preferred() {
        let mut config = BasketConfig::default();
        config.vendors.insert(
            "dell".to_string(),
            VendorOverride {
                lot_sheet: Some("Custom Lots".to_string()),
                header_row: None,
            },
        );
        let parser = BasketParser::new(config);
        let wb = Workbook::new(vec![dell_sheet("Dell Lot Pricing"), dell_sheet("Custom Lots")]);
        let outcome = parser.parse(&wb, &meta()).unwrap();
        assert_eq!(outcome.models[0].source_sheet, "Custom Lots");
    }

    #[test]
    fn test_blank_vendor_is_detected() {
        let parser = BasketParser::default();
        let wb = Workbook::new(vec![dell_sheet("Dell Lot Pricing")]);
        let outcome = parser.parse(&wb, &BasketMeta::new("")).unwrap();
        assert_eq!(outcome.basket.vendor, "dell");
        assert!(Uuid::parse_str(&outcome.basket.id).is_ok());
    }
}
