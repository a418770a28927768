//! Loading basket files into the engine's cell grid.

use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use basket_core::{Cell, Sheet, Workbook};

/// Extensions `load` understands.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "json"];

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a spreadsheet (any calamine format) or a JSON cell grid.
pub fn load(path: &Path) -> anyhow::Result<Workbook> {
    match extension(path).as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Workbook::from_json(&content)?)
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path),
        other => anyhow::bail!("Unsupported file format: {}", other),
    }
}

fn load_spreadsheet(path: &Path) -> anyhow::Result<Workbook> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet {}", path.display()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet '{}'", name))?;
        let rows = range_rows(&range);
        debug!("Loaded sheet '{}' with {} rows", name, rows.len());
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Workbook::new(sheets))
}

/// Rows of a range, anchored at A1. Calamine ranges start at the first used
/// cell, so leading rows and columns are padded back in.
fn range_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::text(b.to_string()),
        Data::DateTime(dt) => excel_date(dt.as_f64())
            .map(|date| Cell::Date { date })
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|date| Cell::Date { date })
            .unwrap_or_else(|| Cell::from(s.as_str())),
        Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Error(e) => Cell::text(format!("#{:?}", e)),
    }
}

/// Excel serial day number to a date (1900 date system).
fn excel_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_date(45839.0), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(excel_date(45839.75), NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(excel_date(0.0), None);
    }

    #[test]
    fn test_range_is_anchored_at_a1() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Lot Description".to_string()));
        range.set_value((3, 2), Data::Float(9500.0));

        let rows = range_rows(&range);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2][1], Cell::text("Lot Description"));
        assert_eq!(rows[3][2], Cell::Number(9500.0));
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("dell_q3.XLSX")));
        assert!(is_supported(Path::new("basket.json")));
        assert!(!is_supported(Path::new("quote.pdf")));
    }
}
