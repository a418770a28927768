//! Core library for hardware basket normalization.
//!
//! This crate provides:
//! - Lot segmentation of vendor quote worksheets (heading-column and marker-row layouts)
//! - Line item classification and specification extraction from free text
//! - Consolidated per-model specifications and pricing/support records
//! - Read-time specification inference from extension records
//!
//! Workbooks arrive as already-loaded cell grids; file I/O lives in the CLI.

pub mod basket;
pub mod diagnostics;
pub mod error;
pub mod inference;
pub mod models;

pub use basket::{BasketParser, ParseOutcome, VendorProfile};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Location, Severity};
pub use error::{BasketError, Result};
pub use inference::{augment_specification, infer_from_extensions, InferenceRules};
pub use models::catalog::{
    Basket, BasketMeta, CatalogOption, Category, Configuration, Extension, Model, Pricing, SupportOption,
};
pub use models::config::BasketConfig;
pub use models::grid::{Cell, Sheet, Workbook};
pub use models::spec::{ConsolidatedSpecification, SpecFragment};
