//! Regex patterns and value normalizers shared by the inference stages.

pub mod patterns;
pub mod values;

pub use patterns::*;
pub use values::{
    compact_capacity, extract_cores, extract_frequency, extract_tdp, extract_threads,
    format_capacity_gb, normalize_capacity, parse_capacity_gb, parse_number, parse_quantity,
};
