//! Normalized catalog records produced by one ingestion run.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::spec::{ConsolidatedSpecification, SpecFragment};

/// Component category assigned to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BaseServer,
    Processor,
    Memory,
    Storage,
    Network,
    Expansion,
    Service,
    Software,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::BaseServer,
        Category::Processor,
        Category::Memory,
        Category::Storage,
        Category::Network,
        Category::Expansion,
        Category::Service,
        Category::Software,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BaseServer => "base_server",
            Category::Processor => "processor",
            Category::Memory => "memory",
            Category::Storage => "storage",
            Category::Network => "network",
            Category::Expansion => "expansion",
            Category::Service => "service",
            Category::Software => "software",
        }
    }

    /// Categories whose descriptions carry structured hardware specs.
    pub fn has_structured_spec(&self) -> bool {
        matches!(
            self,
            Category::Processor | Category::Memory | Category::Storage | Category::Network
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied metadata describing the uploaded basket file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasketMeta {
    /// Vendor name, matched against the registered vendor profiles.
    pub vendor: String,

    /// Explicit basket identifier; a random one is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basket_id: Option<String>,

    /// Free-form revision tag (e.g. "v2").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Calendar quarter, 1-4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Source file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Date prices become valid; defaults to the start of the quarter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
}

impl BasketMeta {
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            ..Default::default()
        }
    }

    pub fn with_basket_id(mut self, id: impl Into<String>) -> Self {
        self.basket_id = Some(id.into());
        self
    }

    pub fn with_period(mut self, quarter: u8, year: i32) -> Self {
        self.quarter = Some(quarter);
        self.year = Some(year);
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Human-readable revision, e.g. "Q3 2025 v2".
    pub fn revision_tag(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(q) = self.quarter {
            parts.push(format!("Q{}", q));
        }
        if let Some(y) = self.year {
            parts.push(y.to_string());
        }
        if let Some(r) = &self.revision {
            parts.push(r.clone());
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Explicit `valid_from`, else the first day of the quarter.
    pub fn period_start(&self) -> Option<NaiveDate> {
        if self.valid_from.is_some() {
            return self.valid_from;
        }
        let (quarter, year) = (self.quarter?, self.year?);
        if !(1..=4).contains(&quarter) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, u32::from(quarter - 1) * 3 + 1, 1)
    }
}

/// One ingested quote file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basket {
    pub id: String,
    pub vendor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// One hardware SKU discovered as a lot inside a basket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub basket_id: String,
    pub vendor_id: String,

    /// Raw lot heading; unique within one parse run.
    pub lot_description: String,

    /// Short lot code such as "SMI1", when the heading carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_code: Option<String>,

    pub model_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,

    pub category: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_factor: Option<String>,

    pub specification: ConsolidatedSpecification,

    pub source_sheet: String,
    pub source_row: usize,
}

/// One component line item of a model, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub model_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,

    /// Vendor's item label (e.g. "RAM (Capacity)"), when the layout has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub description: String,
    pub category: Category,
    pub quantity: u32,
    pub specification: SpecFragment,
    pub source_row: usize,
}

/// Price and support terms of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub model_id: String,

    /// Primary currency code of the basket.
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Decimal>,

    /// Net price keyed by currency code; unknown prices are absent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub net_prices: BTreeMap<String, Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support_options: Vec<SupportOption>,
}

impl Pricing {
    pub fn net_price(&self, currency: &str) -> Option<Decimal> {
        self.net_prices.get(currency).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportOption {
    pub duration_years: u32,
    /// Support tier, e.g. "prosupport", "warranty".
    #[serde(rename = "type")]
    pub tier: String,
    #[serde(default)]
    pub prices: BTreeMap<String, Decimal>,
}

/// Standalone option/upgrade from a vendor's options or parts sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    pub description: String,
    pub category: Category,
    pub specification: SpecFragment,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prices: BTreeMap<String, Decimal>,
    pub source_row: usize,
}

/// Discrete component record attached to a stored model, used to re-derive
/// a specification at read time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

impl Extension {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_start_from_quarter() {
        let meta = BasketMeta::new("dell").with_period(3, 2025);
        assert_eq!(meta.period_start(), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(meta.revision_tag(), Some("Q3 2025".to_string()));

        let bad = BasketMeta::new("dell").with_period(7, 2025);
        assert_eq!(bad.period_start(), None);
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::BaseServer).unwrap(),
            "\"base_server\""
        );
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json.trim_matches('"'), category.as_str());
        }
    }
}
