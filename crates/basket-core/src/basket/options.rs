//! Standalone options/parts sheet parsing.

use std::collections::BTreeMap;

use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::models::catalog::CatalogOption;
use crate::models::grid::{cell_at, Sheet};

use super::columns::{resolve_layout, LayoutSource, PriceField};
use super::pricing::read_columns;
use super::vendor::VendorProfile;

/// Parse every described row of an options sheet into catalog options.
pub fn extract_options(
    sheet: &Sheet,
    profile: &VendorProfile,
    scan_rows: usize,
    default_currency: &str,
    allow_fixed_offsets: bool,
) -> (Vec<CatalogOption>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let (layout, source) = resolve_layout(
        &sheet.rows,
        &profile.options_headers,
        &profile.options_fixed_layout,
        scan_rows,
        default_currency,
        allow_fixed_offsets,
    );
    if source != LayoutSource::Headers && !layout.prices.is_empty() {
        diagnostics.warning(
            DiagnosticKind::PricingColumnFallback,
            Location::sheet(&sheet.name),
            "options price columns located by fixed offsets",
        );
    }

    let mut options = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate().skip(layout.data_start()) {
        let text = |col: Option<usize>| col.and_then(|c| cell_at(row, c).as_text());
        let part_number = text(layout.part_number);
        let description = text(layout.description);
        if part_number.is_none() && description.is_none() {
            continue;
        }
        let description = description.unwrap_or_default();
        let (category, specification) = profile.inference.infer_line("", &description);

        let prices: BTreeMap<String, _> = read_columns(row, &layout.prices, &sheet.name, index, &mut diagnostics)
            .into_iter()
            .filter(|(column, _)| column.field == PriceField::Net)
            .map(|(column, value)| (column.currency.clone(), value))
            .collect();

        options.push(CatalogOption {
            part_number,
            description,
            category,
            specification,
            prices,
            source_row: index + 1,
        });
    }

    debug!("Parsed {} options from '{}'", options.len(), sheet.name);
    (options, diagnostics)
}
