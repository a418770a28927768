//! Value normalizers for prices, capacities and processor figures.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::patterns::{CAPACITY, CORES, FREQUENCY, TDP, THREADS};

const CURRENCY_CODES: [&str; 3] = ["USD", "EUR", "GBP"];

/// Parse a price or quantity cell (e.g. "$1,234.56", "1.234,56 €", "12.5").
///
/// Returns `None` for blanks, placeholders ("-", "N/A", "TBD") and any text
/// with letters other than a currency code.
pub fn parse_number(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let negative = trimmed.starts_with('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let mut rest = trimmed.to_uppercase();
    for code in CURRENCY_CODES {
        rest = rest.replace(code, "");
    }
    if rest.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    let cleaned: String = rest
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = normalize_separators(&cleaned);
    let normalized = normalized.trim_end_matches('.');
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

fn normalize_separators(cleaned: &str) -> String {
    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    match (commas, dots) {
        (0, 0) => cleaned.to_string(),
        (c, d) if c > 0 && d > 0 => {
            // Whichever separator comes last is the decimal point
            let comma_pos = cleaned.rfind(',');
            let dot_pos = cleaned.rfind('.');
            match (comma_pos, dot_pos) {
                (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
                _ => cleaned.replace(',', ""),
            }
        }
        (1, 0) => {
            let (_, fraction) = cleaned.split_once(',').unwrap_or((cleaned, ""));
            if fraction.len() == 3 {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (_, 0) => cleaned.replace(',', ""),
        (0, 1) => cleaned.to_string(),
        _ => cleaned.replace('.', ""),
    }
}

/// Parse the first capacity in `text` to gigabytes ("2TB" -> 2048, "512MB" -> 0.5).
pub fn parse_capacity_gb(text: &str) -> Option<Decimal> {
    let caps = CAPACITY.captures(text)?;
    let value = Decimal::from_str(&caps[1]).ok()?;
    let gb = match caps[2].to_uppercase().as_str() {
        "TB" => value * Decimal::from(1024),
        "MB" => value / Decimal::from(1024),
        _ => value,
    };
    Some(gb)
}

/// Render a gigabyte amount as "<n>GB".
pub fn format_capacity_gb(gb: Decimal) -> String {
    format!("{}GB", gb.normalize())
}

/// Capacity text rewritten to gigabytes ("2 TB" -> "2048GB").
pub fn normalize_capacity(text: &str) -> Option<String> {
    parse_capacity_gb(text).map(format_capacity_gb)
}

/// Capacity text with spacing removed and the unit upper-cased ("1.92 tb" -> "1.92TB").
pub fn compact_capacity(text: &str) -> Option<String> {
    let caps = CAPACITY.captures(text)?;
    Some(format!("{}{}", &caps[1], caps[2].to_uppercase()))
}

/// Base frequency as "<n>GHz".
pub fn extract_frequency(text: &str) -> Option<String> {
    let caps = FREQUENCY.captures(text)?;
    format_frequency(&caps[1])
}

pub(crate) fn format_frequency(number: &str) -> Option<String> {
    let value = Decimal::from_str(number).ok()?;
    Some(format!("{}GHz", value.normalize()))
}

pub fn extract_cores(text: &str) -> Option<u32> {
    CORES.captures(text)?[1].parse().ok()
}

pub fn extract_threads(text: &str) -> Option<u32> {
    let caps = THREADS.captures(text)?;
    caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
}

/// Thermal design power in watts.
pub fn extract_tdp(text: &str) -> Option<u32> {
    TDP.captures(text)?[1].parse().ok()
}

/// Port count from "Single"/"Dual"/"Quad" or a digit string.
pub fn port_count(word: &str) -> Option<u32> {
    match word.to_lowercase().as_str() {
        "single" => Some(1),
        "dual" | "two" => Some(2),
        "quad" | "four" => Some(4),
        other => other.parse().ok(),
    }
}

pub fn format_port_speed(speed: &str) -> String {
    format!("{}GbE", speed.trim())
}

/// Quantity cell text; absent or unparseable quantities default to 1.
pub fn parse_quantity(text: Option<&str>) -> u32 {
    text.and_then(parse_number)
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u32())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_number("12.5"), Some(dec("12.5")));
        assert_eq!(parse_number("1,234"), Some(dec("1234")));
        assert_eq!(parse_number("1.234,56 €"), Some(dec("1234.56")));
        assert_eq!(parse_number("12,5"), Some(dec("12.5")));
        assert_eq!(parse_number("USD 2 500"), Some(dec("2500")));
        assert_eq!(parse_number("1.234.567"), Some(dec("1234567")));
        assert_eq!(parse_number("-15"), Some(dec("-15")));
    }

    #[test]
    fn test_parse_number_rejects_placeholders() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("Included"), None);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(parse_capacity_gb("2TB"), Some(dec("2048")));
        assert_eq!(parse_capacity_gb("512MB"), Some(dec("0.5")));
        assert_eq!(parse_capacity_gb("16 GB RDIMM"), Some(dec("16")));
        assert_eq!(parse_capacity_gb("no size"), None);
        assert_eq!(normalize_capacity("2 TB"), Some("2048GB".to_string()));
        assert_eq!(compact_capacity("1.92 tb SSD"), Some("1.92TB".to_string()));
    }

    #[test]
    fn test_processor_figures() {
        let text = "Intel Xeon Silver 4410T 10C 150W 2.7GHz Processor";
        assert_eq!(extract_cores(text), Some(10));
        assert_eq!(extract_tdp(text), Some(150));
        assert_eq!(extract_frequency(text), Some("2.7GHz".to_string()));
        assert_eq!(extract_threads(text), None);
        assert_eq!(extract_threads("(8C/16T 2.9GHz)"), Some(16));
        assert_eq!(extract_frequency("2.10 GHz"), Some("2.1GHz".to_string()));
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(parse_quantity(Some("2")), 2);
        assert_eq!(parse_quantity(Some("")), 1);
        assert_eq!(parse_quantity(Some("n/a")), 1);
        assert_eq!(parse_quantity(Some("0")), 1);
        assert_eq!(parse_quantity(None), 1);
    }
}
