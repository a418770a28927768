//! Configuration structures for basket parsing.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BasketError, Result};

/// Main configuration for the basket engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasketConfig {
    /// Row scanning and inference configuration.
    pub parse: ParseConfig,

    /// Price column configuration.
    pub pricing: PricingConfig,

    /// Per-vendor overrides keyed by vendor id ("dell", "lenovo").
    pub vendors: HashMap<String, VendorOverride>,
}

/// Row scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// How many leading rows are searched for the header row.
    pub header_scan_rows: usize,

    /// Record a warning when a hardware description matches no pattern.
    pub warn_on_unparsed: bool,

    /// Parse the vendor's options/parts sheet when present.
    pub include_options: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            warn_on_unparsed: true,
            include_options: true,
        }
    }
}

/// Price column configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Currency assumed when no header names one.
    pub default_currency: String,

    /// Fall back to the vendor's fixed column offsets when headers are missing.
    pub allow_fixed_offsets: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            allow_fixed_offsets: true,
        }
    }
}

/// Overrides for one vendor profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorOverride {
    /// Lot sheet name searched before the built-in names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_sheet: Option<String>,

    /// 0-based header row used when header detection fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
}

impl BasketConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BasketConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.parse.header_scan_rows == 0 {
            return Err(BasketError::Config(
                "parse.header_scan_rows must be at least 1".to_string(),
            ));
        }
        let currency = self.pricing.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BasketError::Config(format!(
                "pricing.default_currency must be a 3-letter code, got {:?}",
                self.pricing.default_currency
            )));
        }
        Ok(())
    }

    pub fn vendor_override(&self, vendor_id: &str) -> Option<&VendorOverride> {
        self.vendors.get(&vendor_id.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BasketConfig =
            serde_json::from_str(r#"{"pricing": {"default_currency": "EUR"}}"#).unwrap();
        assert_eq!(config.pricing.default_currency, "EUR");
        assert!(config.pricing.allow_fixed_offsets);
        assert_eq!(config.parse.header_scan_rows, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BasketConfig::default();
        config.vendors.insert(
            "dell".to_string(),
            VendorOverride {
                lot_sheet: Some("Lots".to_string()),
                header_row: Some(2),
            },
        );
        config.save(&path).unwrap();

        let loaded = BasketConfig::from_file(&path).unwrap();
        assert_eq!(
            loaded.vendor_override("Dell").unwrap().lot_sheet.as_deref(),
            Some("Lots")
        );
    }

    #[test]
    fn test_invalid_currency_rejected() {
        let mut config = BasketConfig::default();
        config.pricing.default_currency = "dollars".to_string();
        assert!(matches!(config.validate(), Err(BasketError::Config(_))));
    }
}
