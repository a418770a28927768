//! Header-row detection and column positions for a lot or options sheet.

use serde::{Deserialize, Serialize};

use crate::inference::rules::patterns::SUPPORT_DURATION;
use crate::models::grid::Cell;

/// A logical column of a quote sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Heading,
    Label,
    PartNumber,
    Description,
    Quantity,
}

/// Header names per role, matched case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderNames {
    pub heading: Vec<String>,
    pub label: Vec<String>,
    pub part_number: Vec<String>,
    pub description: Vec<String>,
    pub quantity: Vec<String>,
    /// Roles a row must name to count as the header row.
    pub required: Vec<ColumnRole>,
}

impl HeaderNames {
    fn names(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Heading => &self.heading,
            ColumnRole::Label => &self.label,
            ColumnRole::PartNumber => &self.part_number,
            ColumnRole::Description => &self.description,
            ColumnRole::Quantity => &self.quantity,
        }
    }
}

pub(crate) fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_lowercase()).collect()
}

/// What a price column holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceField {
    List,
    Net,
    Support { years: u32, tier: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceColumn {
    pub index: usize,
    pub field: PriceField,
    pub currency: String,
    pub header: String,
}

impl PriceColumn {
    pub fn new(index: usize, field: PriceField, currency: &str) -> Self {
        Self {
            index,
            field,
            currency: currency.to_string(),
            header: String::new(),
        }
    }

    pub fn support(index: usize, years: u32, tier: &str, currency: &str) -> Self {
        Self::new(
            index,
            PriceField::Support {
                years,
                tier: tier.to_string(),
            },
            currency,
        )
    }
}

/// Resolved column positions. Row indices are 0-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub header_row: usize,
    pub heading: Option<usize>,
    pub label: Option<usize>,
    pub part_number: Option<usize>,
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub prices: Vec<PriceColumn>,
}

impl ColumnLayout {
    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Heading => self.heading,
            ColumnRole::Label => self.label,
            ColumnRole::PartNumber => self.part_number,
            ColumnRole::Description => self.description,
            ColumnRole::Quantity => self.quantity,
        }
    }

    fn set(&mut self, role: ColumnRole, index: usize) {
        let slot = match role {
            ColumnRole::Heading => &mut self.heading,
            ColumnRole::Label => &mut self.label,
            ColumnRole::PartNumber => &mut self.part_number,
            ColumnRole::Description => &mut self.description,
            ColumnRole::Quantity => &mut self.quantity,
        };
        *slot = Some(index);
    }

    /// First row after the header row.
    pub fn data_start(&self) -> usize {
        self.header_row + 1
    }
}

/// How a layout was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// Every column came from header names.
    Headers,
    /// Header row found, price columns taken from fixed offsets.
    HeadersWithFixedPrices,
    /// No header row qualified; the whole fixed layout applies.
    Fixed,
}

const ROLES: [ColumnRole; 5] = [
    ColumnRole::Heading,
    ColumnRole::Label,
    ColumnRole::PartNumber,
    ColumnRole::Description,
    ColumnRole::Quantity,
];

/// Locate the header row among the first `scan_rows` rows and map its cells.
///
/// Returns the fixed layout when no row names every required role, and
/// borrows the fixed price columns when the header row has no price headers.
/// Fixed price columns are never used unless `allow_fixed_prices`.
pub fn resolve_layout(
    rows: &[Vec<Cell>],
    headers: &HeaderNames,
    fixed: &ColumnLayout,
    scan_rows: usize,
    default_currency: &str,
    allow_fixed_prices: bool,
) -> (ColumnLayout, LayoutSource) {
    for (index, row) in rows.iter().take(scan_rows).enumerate() {
        let Some(mut layout) = layout_from_header_row(row, headers, default_currency) else {
            continue;
        };
        layout.header_row = index;
        if layout.prices.is_empty() && allow_fixed_prices && !fixed.prices.is_empty() {
            layout.prices = fixed.prices.clone();
            return (layout, LayoutSource::HeadersWithFixedPrices);
        }
        return (layout, LayoutSource::Headers);
    }
    let mut layout = fixed.clone();
    if !allow_fixed_prices {
        layout.prices.clear();
    }
    (layout, LayoutSource::Fixed)
}

fn layout_from_header_row(row: &[Cell], headers: &HeaderNames, default_currency: &str) -> Option<ColumnLayout> {
    let texts: Vec<Option<String>> = row
        .iter()
        .map(|c| c.as_text().map(|t| t.to_lowercase()))
        .collect();

    let mut layout = ColumnLayout::default();
    let mut used = vec![false; texts.len()];

    // Exact names first so "Lot Description" is not taken for "Description"
    for exact in [true, false] {
        for role in ROLES {
            if layout.column(role).is_some() {
                continue;
            }
            let names = headers.names(role);
            let found = texts.iter().enumerate().find(|(i, text)| {
                !used[*i]
                    && text.as_deref().is_some_and(|t| {
                        names
                            .iter()
                            .any(|n| if exact { t == n } else { t.contains(n.as_str()) })
                    })
            });
            if let Some((i, _)) = found {
                used[i] = true;
                layout.set(role, i);
            }
        }
    }

    if headers.required.is_empty() || headers.required.iter().any(|r| layout.column(*r).is_none()) {
        return None;
    }

    for (i, text) in texts.iter().enumerate() {
        if used[i] {
            continue;
        }
        if let Some(mut column) = text.as_deref().and_then(|t| classify_price_header(t, default_currency)) {
            column.index = i;
            column.header = row[i].as_text().unwrap_or_default();
            layout.prices.push(column);
        }
    }

    Some(layout)
}

/// Currency named by a header: "usd"/"$", "eur"/"€", "gbp"/"£".
pub fn detect_currency(header: &str) -> Option<&'static str> {
    let h = header.to_lowercase();
    let has_word = |w: &str| {
        h.split(|c: char| !c.is_ascii_alphabetic())
            .any(|part| part == w)
    };
    if has_word("usd") || h.contains('$') {
        Some("USD")
    } else if has_word("eur") || h.contains('€') {
        Some("EUR")
    } else if has_word("gbp") || h.contains('£') {
        Some("GBP")
    } else {
        None
    }
}

/// Support tier from a header, e.g. "3Y ProSupport Plus USD" -> "prosupport_plus".
fn support_tier(h: &str) -> Option<&'static str> {
    if h.contains("prosupport plus") || h.contains("psp") {
        Some("prosupport_plus")
    } else if h.contains("prosupport") || h.contains(" ps ") || h.ends_with(" ps") {
        Some("prosupport")
    } else if h.contains("premier") {
        Some("premier")
    } else if h.contains("foundation") {
        Some("foundation")
    } else if h.contains("warranty") {
        Some("warranty")
    } else if h.contains("support") || h.contains("care") {
        Some("support")
    } else {
        None
    }
}

/// Price column meaning of a lower-cased header, with `index` left at 0.
pub fn classify_price_header(header: &str, default_currency: &str) -> Option<PriceColumn> {
    let h = format!(" {} ", header.trim());
    let currency = detect_currency(&h).unwrap_or(default_currency);

    if let Some(tier) = support_tier(&h) {
        if let Some(caps) = SUPPORT_DURATION.captures(&h) {
            let years = caps[1].parse().ok()?;
            return Some(PriceColumn::support(0, years, tier, currency));
        }
    }
    if h.contains("list price") {
        return Some(PriceColumn::new(0, PriceField::List, currency));
    }
    if h.contains("price") {
        return Some(PriceColumn::new(0, PriceField::Net, currency));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn dell_headers() -> HeaderNames {
        HeaderNames {
            heading: names(&["lot description"]),
            label: names(&["item"]),
            description: names(&["specification", "description"]),
            required: vec![ColumnRole::Heading, ColumnRole::Label, ColumnRole::Description],
            ..Default::default()
        }
    }

    #[test]
    fn test_header_row_found_by_names() {
        let rows = vec![
            row(&["Dell Quote"]),
            row(&[]),
            row(&[
                "Lot Description",
                "Item",
                "Specification",
                "List Price",
                "Net Price USD",
                "Net Price EUR",
                "3Y ProSupport USD",
                "5yr ProSupport Plus USD",
            ]),
        ];
        let (layout, source) =
            resolve_layout(&rows, &dell_headers(), &ColumnLayout::default(), 10, "USD", true);

        assert_eq!(source, LayoutSource::Headers);
        assert_eq!(layout.header_row, 2);
        assert_eq!(layout.heading, Some(0));
        assert_eq!(layout.label, Some(1));
        assert_eq!(layout.description, Some(2));
        let fields: Vec<_> = layout
            .prices
            .iter()
            .map(|p| (p.index, p.field.clone(), p.currency.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                (3, PriceField::List, "USD"),
                (4, PriceField::Net, "USD"),
                (5, PriceField::Net, "EUR"),
                (6, PriceField::Support { years: 3, tier: "prosupport".to_string() }, "USD"),
                (7, PriceField::Support { years: 5, tier: "prosupport_plus".to_string() }, "USD"),
            ]
        );
    }

    #[test]
    fn test_fixed_layout_when_no_header() {
        let fixed = ColumnLayout {
            header_row: 3,
            heading: Some(0),
            ..Default::default()
        };
        let rows = vec![row(&["nothing", "here"])];
        let (layout, source) = resolve_layout(&rows, &dell_headers(), &fixed, 10, "USD", true);
        assert_eq!(source, LayoutSource::Fixed);
        assert_eq!(layout, fixed);
    }

    #[test]
    fn test_fixed_layout_drops_prices_when_disallowed() {
        let fixed = ColumnLayout {
            header_row: 3,
            heading: Some(0),
            prices: vec![
                PriceColumn::new(3, PriceField::List, "USD"),
                PriceColumn::new(4, PriceField::Net, "USD"),
            ],
            ..Default::default()
        };
        let rows = vec![row(&["Lot A", "Processor", "1 x 4309Y", "12000", "9500"])];
        let (layout, source) = resolve_layout(&rows, &dell_headers(), &fixed, 10, "USD", false);
        assert_eq!(source, LayoutSource::Fixed);
        assert_eq!(layout.heading, Some(0));
        assert!(layout.prices.is_empty());
    }

    #[test]
    fn test_fixed_prices_when_header_has_none() {
        let fixed = ColumnLayout {
            prices: vec![PriceColumn::new(3, PriceField::List, "USD")],
            ..Default::default()
        };
        let rows = vec![row(&["Lot Description", "Item", "Specification"])];
        let (layout, source) = resolve_layout(&rows, &dell_headers(), &fixed, 10, "USD", true);
        assert_eq!(source, LayoutSource::HeadersWithFixedPrices);
        assert_eq!(layout.prices, fixed.prices);

        let (layout, source) = resolve_layout(&rows, &dell_headers(), &fixed, 10, "USD", false);
        assert_eq!(source, LayoutSource::Headers);
        assert!(layout.prices.is_empty());
    }

    #[test]
    fn test_price_header_currencies() {
        assert_eq!(detect_currency("price in $"), Some("USD"));
        assert_eq!(detect_currency("Total Price in EUR"), Some("EUR"));
        assert_eq!(detect_currency("europe"), None);
        let column = classify_price_header("3yr premier support eur", "USD").unwrap();
        assert_eq!(column.currency, "EUR");
        assert_eq!(
            column.field,
            PriceField::Support {
                years: 3,
                tier: "premier".to_string()
            }
        );
    }
}
