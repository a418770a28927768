//! Spreadsheet basket ingestion: layout, lots, identity, pricing and options.

pub mod columns;
pub mod identity;
pub mod options;
mod parser;
pub mod pricing;
pub mod segmenter;
pub mod vendor;

pub use columns::{ColumnLayout, ColumnRole, HeaderNames, LayoutSource, PriceColumn, PriceField};
pub use parser::{BasketParser, ParseOutcome};
pub use vendor::{LotBoundary, VendorProfile};
