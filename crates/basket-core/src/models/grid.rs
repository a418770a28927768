//! Sheet-indexed cell grid handed to the engine by the spreadsheet loader.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{BasketError, Result};

/// A single spreadsheet cell value.
///
/// In JSON, `null` is an empty cell, numbers and strings map directly and a
/// date is written as `{"date": "2025-07-01"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date { date: NaiveDate },
    #[default]
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text content; numbers and dates are rendered.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Date { date } => Some(date.to_string()),
        }
    }

    /// Decimal view of a numeric cell. Text cells are not parsed here.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) if n.is_finite() => Decimal::from_f64(*n),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Render a float without a trailing `.0` for integral values.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One worksheet: a name and its rows in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Cell lookup on a row slice, padding missing columns with `Cell::Empty`.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

/// A loaded basket file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// First sheet whose name contains any of `needles` (case-insensitive).
    pub fn find_sheet(&self, needles: &[String]) -> Option<&Sheet> {
        needles.iter().find_map(|needle| {
            let needle = needle.to_lowercase();
            self.sheets
                .iter()
                .find(|s| s.name.to_lowercase().contains(&needle))
        })
    }

    /// Check the shape contract: sheet names are non-empty and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            let name = sheet.name.trim();
            if name.is_empty() {
                return Err(BasketError::InvalidWorkbook(
                    "sheet with an empty name".to_string(),
                ));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(BasketError::InvalidWorkbook(format!(
                    "duplicate sheet name: {}",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Load a workbook from its JSON grid representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let workbook: Workbook = serde_json::from_str(json)?;
        workbook.validate()?;
        Ok(workbook)
    }
}
