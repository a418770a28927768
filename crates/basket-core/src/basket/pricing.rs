//! Pricing records from a lot's opening-row price cells.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::inference::rules::values::parse_number;
use crate::models::catalog::{Pricing, SupportOption};
use crate::models::grid::{cell_at, Cell};

use super::columns::{ColumnLayout, PriceColumn, PriceField};

/// Where the price cells come from and what surrounds them.
#[derive(Debug, Clone)]
pub struct PricingContext<'a> {
    pub sheet: &'a str,
    /// 0-based row of the price cells.
    pub row: usize,
    pub default_currency: &'a str,
    pub valid_from: Option<NaiveDate>,
    /// Warranty years taken from the lot heading, priced at the net price.
    pub heading_warranty_years: Option<u32>,
}

/// Read one price cell. Blank cells are `Ok(None)`; non-empty cells that are
/// not numbers are `Err` with the offending text.
pub fn read_price(cell: &Cell) -> Result<Option<Decimal>, String> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(_) => cell.as_decimal().map(Some).ok_or_else(|| "non-finite number".to_string()),
        Cell::Text(text) if text.trim().is_empty() => Ok(None),
        Cell::Text(text) => parse_number(text).map(Some).ok_or_else(|| text.trim().to_string()),
        Cell::Date { date } => Err(date.to_string()),
    }
}

/// Price cell values for each column, with failures recorded.
pub(crate) fn read_columns<'c>(
    cells: &[Cell],
    columns: &'c [PriceColumn],
    sheet: &str,
    row: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<(&'c PriceColumn, Decimal)> {
    let mut values = Vec::new();
    for column in columns {
        match read_price(cell_at(cells, column.index)) {
            Ok(Some(value)) => values.push((column, value)),
            Ok(None) => {}
            Err(text) => {
                let field = if column.header.is_empty() {
                    format!("column {}", column.index + 1)
                } else {
                    column.header.clone()
                };
                diagnostics.warning(
                    DiagnosticKind::PriceParseFailure,
                    Location::row(sheet, row).with_field(field),
                    format!("cannot read price from '{}'", text),
                );
            }
        }
    }
    values
}

/// Build the Pricing record for one model. `None` when no price and no
/// support option is known.
pub fn extract_pricing(
    model_id: &str,
    cells: &[Cell],
    layout: &ColumnLayout,
    ctx: &PricingContext<'_>,
) -> (Option<Pricing>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let values = read_columns(cells, &layout.prices, ctx.sheet, ctx.row, &mut diagnostics);

    let mut list_prices: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut net_prices: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut support_options: Vec<SupportOption> = Vec::new();

    for (column, value) in values {
        match &column.field {
            PriceField::List => {
                list_prices.entry(column.currency.clone()).or_insert(value);
            }
            PriceField::Net => {
                net_prices.entry(column.currency.clone()).or_insert(value);
            }
            PriceField::Support { years, tier } => {
                let existing = support_options
                    .iter_mut()
                    .find(|o| o.duration_years == *years && o.tier == *tier);
                match existing {
                    Some(option) => {
                        option.prices.entry(column.currency.clone()).or_insert(value);
                    }
                    None => support_options.push(SupportOption {
                        duration_years: *years,
                        tier: tier.clone(),
                        prices: BTreeMap::from([(column.currency.clone(), value)]),
                    }),
                }
            }
        }
    }

    if let Some(years) = ctx.heading_warranty_years {
        let already = support_options
            .iter()
            .any(|o| o.duration_years == years && o.tier == "warranty");
        if !already && !net_prices.is_empty() {
            support_options.insert(
                0,
                SupportOption {
                    duration_years: years,
                    tier: "warranty".to_string(),
                    prices: net_prices.clone(),
                },
            );
        }
    }

    if list_prices.is_empty() && net_prices.is_empty() && support_options.is_empty() {
        return (None, diagnostics);
    }

    let currency = primary_currency(ctx.default_currency, &net_prices, &list_prices);
    let list_price = list_prices
        .get(&currency)
        .or_else(|| list_prices.values().next())
        .copied();

    let pricing = Pricing {
        model_id: model_id.to_string(),
        currency,
        list_price,
        net_prices,
        valid_from: ctx.valid_from,
        support_options,
    };
    (Some(pricing), diagnostics)
}

fn primary_currency(
    default: &str,
    net: &BTreeMap<String, Decimal>,
    list: &BTreeMap<String, Decimal>,
) -> String {
    if net.contains_key(default) || list.contains_key(default) {
        return default.to_string();
    }
    net.keys()
        .chain(list.keys())
        .next()
        .cloned()
        .unwrap_or_else(|| default.to_string())
}
