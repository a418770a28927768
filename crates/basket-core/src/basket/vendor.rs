//! Vendor profiles: every vendor-specific heuristic as data.

use regex::Regex;

use crate::inference::rules::patterns::{
    DELL_MODEL, LENOVO_MODEL, LOT_MARKER, THINKAGILE_MODEL,
};
use crate::inference::{ClassifierRules, InferenceRules, SpecRules};
use crate::models::grid::Workbook;

use super::columns::{names, ColumnLayout, ColumnRole, HeaderNames, PriceColumn, PriceField};

/// How lots are delimited inside the lot sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotBoundary {
    /// A dedicated heading column; a new non-empty value starts a lot.
    HeadingColumn,
    /// A description matching the lot marker, with no part number and a price.
    MarkerRow,
}

/// Everything the parser needs to know about one vendor's quote format.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    /// Lower-case identifier ("dell").
    pub id: String,
    pub display_name: String,
    /// Other names accepted for this vendor.
    pub aliases: Vec<String>,

    /// Candidate lot sheet names, in priority order.
    pub lot_sheets: Vec<String>,
    /// Candidate options/parts sheet names.
    pub options_sheets: Vec<String>,

    pub boundary: LotBoundary,
    pub lot_marker: Regex,

    pub headers: HeaderNames,
    pub fixed_layout: ColumnLayout,
    pub options_headers: HeaderNames,
    pub options_fixed_layout: ColumnLayout,

    pub inference: InferenceRules,

    /// Model number patterns; the non-empty capture groups are joined with a space.
    pub model_patterns: Vec<Regex>,
    /// Model number prefix → form factor, checked in order.
    pub form_factors: Vec<(String, String)>,

    /// Derive a support option from a "- 1yr Warranty" lot heading.
    pub heading_warranty: bool,
}

impl VendorProfile {
    pub fn dell() -> Self {
        Self {
            id: "dell".to_string(),
            display_name: "Dell".to_string(),
            aliases: vec!["dell technologies".to_string(), "dell emc".to_string()],
            lot_sheets: vec!["Dell Lot Pricing".to_string(), "Lot Pricing".to_string()],
            options_sheets: vec!["Dell Options and Upgrades".to_string(), "Options and Upgrades".to_string()],
            boundary: LotBoundary::HeadingColumn,
            lot_marker: LOT_MARKER.clone(),
            headers: HeaderNames {
                heading: names(&["lot description", "lot"]),
                label: names(&["item"]),
                description: names(&["specification", "description"]),
                required: vec![ColumnRole::Heading, ColumnRole::Label, ColumnRole::Description],
                ..Default::default()
            },
            fixed_layout: ColumnLayout {
                header_row: 3,
                heading: Some(0),
                label: Some(1),
                description: Some(2),
                prices: vec![
                    PriceColumn::new(3, PriceField::List, "USD"),
                    PriceColumn::new(4, PriceField::Net, "USD"),
                    PriceColumn::new(5, PriceField::Net, "EUR"),
                    PriceColumn::support(6, 3, "prosupport", "USD"),
                    PriceColumn::support(7, 5, "prosupport", "USD"),
                    PriceColumn::support(8, 3, "prosupport_plus", "USD"),
                    PriceColumn::support(9, 5, "prosupport_plus", "USD"),
                ],
                ..Default::default()
            },
            options_headers: HeaderNames {
                part_number: names(&["part number", "sku"]),
                description: names(&["description", "option"]),
                required: vec![ColumnRole::Description],
                ..Default::default()
            },
            options_fixed_layout: ColumnLayout {
                header_row: 0,
                description: Some(0),
                prices: vec![
                    PriceColumn::new(4, PriceField::Net, "USD"),
                    PriceColumn::new(5, PriceField::Net, "EUR"),
                ],
                ..Default::default()
            },
            inference: InferenceRules::new(ClassifierRules::dell(), SpecRules::dell()),
            model_patterns: vec![DELL_MODEL.clone()],
            form_factors: pairs(&[
                ("r6", "1U"),
                ("r7", "2U"),
                ("r8", "2U"),
                ("r9", "4U"),
                ("t", "Tower"),
            ]),
            heading_warranty: false,
        }
    }

    pub fn lenovo() -> Self {
        Self {
            id: "lenovo".to_string(),
            display_name: "Lenovo".to_string(),
            aliases: vec!["lenovo dcg".to_string(), "lenovo isg".to_string()],
            lot_sheets: vec!["Lenovo X86 Server Lots".to_string(), "Server Lots".to_string()],
            options_sheets: vec!["Lenovo X86 Parts".to_string(), "Parts".to_string()],
            boundary: LotBoundary::MarkerRow,
            lot_marker: LOT_MARKER.clone(),
            headers: HeaderNames {
                part_number: names(&["part number", "part no", "part #"]),
                description: names(&["description"]),
                quantity: names(&["qty", "quantity"]),
                required: vec![ColumnRole::PartNumber, ColumnRole::Description],
                ..Default::default()
            },
            fixed_layout: ColumnLayout {
                header_row: 3,
                part_number: Some(1),
                description: Some(2),
                quantity: Some(3),
                prices: vec![
                    PriceColumn::new(4, PriceField::Net, "USD"),
                    PriceColumn::new(5, PriceField::Net, "EUR"),
                    PriceColumn::support(6, 3, "warranty", "USD"),
                    PriceColumn::support(7, 3, "warranty", "EUR"),
                ],
                ..Default::default()
            },
            options_headers: HeaderNames {
                part_number: names(&["part number", "part no", "part #"]),
                description: names(&["description"]),
                required: vec![ColumnRole::PartNumber, ColumnRole::Description],
                ..Default::default()
            },
            options_fixed_layout: ColumnLayout {
                header_row: 0,
                part_number: Some(0),
                description: Some(1),
                prices: vec![
                    PriceColumn::new(2, PriceField::Net, "USD"),
                    PriceColumn::new(3, PriceField::Net, "EUR"),
                ],
                ..Default::default()
            },
            inference: InferenceRules::new(ClassifierRules::lenovo(), SpecRules::lenovo()),
            model_patterns: vec![LENOVO_MODEL.clone(), THINKAGILE_MODEL.clone()],
            form_factors: pairs(&[
                ("sr630", "1U"),
                ("sr645", "1U"),
                ("sr650", "2U"),
                ("sr665", "2U"),
                ("sr850", "4U"),
                ("st550", "Tower"),
                ("st650", "4U"),
                ("vx", "2U"),
                ("hx", "1U"),
            ]),
            heading_warranty: true,
        }
    }

    /// Built-in profiles.
    pub fn builtin() -> Vec<VendorProfile> {
        vec![Self::dell(), Self::lenovo()]
    }

    /// True if `name` is this vendor's id, display name or an alias.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        name == self.id
            || name == self.display_name.to_lowercase()
            || self.aliases.iter().any(|a| *a == name)
    }

    /// True if the workbook contains one of this vendor's lot sheets.
    pub fn recognizes(&self, workbook: &Workbook) -> bool {
        workbook.find_sheet(&self.lot_sheets).is_some()
    }
}

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Profile whose lot sheet appears in the workbook. Vendor-prefixed sheet
/// names are checked before the generic fallbacks.
pub fn detect<'a>(workbook: &Workbook, profiles: &'a [VendorProfile]) -> Option<&'a VendorProfile> {
    profiles
        .iter()
        .find(|p| {
            p.lot_sheets
                .first()
                .is_some_and(|name| workbook.find_sheet(std::slice::from_ref(name)).is_some())
        })
        .or_else(|| profiles.iter().find(|p| p.recognizes(workbook)))
}
