//! Non-fatal findings collected during one parse run.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A structured-category description matched no pattern.
    RowParseWarning,
    /// A row could start a lot or continue one; resolved by a fixed rule.
    AmbiguousLotBoundary,
    /// A non-empty price cell could not be read as a number.
    PriceParseFailure,
    /// The vendor's lot sheet is absent; the basket yields nothing.
    MissingRequiredSheet,
    /// An item row appeared before any lot heading.
    OrphanRow,
    /// A lot heading was seen twice and was given a discriminator.
    DuplicateLot,
    /// Columns were located by fixed offsets instead of header names.
    PricingColumnFallback,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a diagnostic points. Rows are 1-based, as a spreadsheet shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Location {
    pub fn sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
            ..Default::default()
        }
    }

    /// Location from a 0-based row index.
    pub fn row(sheet: impl Into<String>, index: usize) -> Self {
        Self {
            sheet: Some(sheet.into()),
            row: Some(index + 1),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(sheet) = &self.sheet {
            write!(f, "{}", sheet)?;
            first = false;
        }
        if let Some(row) = self.row {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "row {}", row)?;
            first = false;
        }
        if let Some(field) = &self.field {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "[{}]", field)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

/// Per-run collector, returned by value with the parse result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity >= Severity::Warning {
            warn!("{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }

    pub fn warning(&mut self, kind: DiagnosticKind, location: Location, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location,
        });
    }

    pub fn error(&mut self, kind: DiagnosticKind, location: Location, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location,
        });
    }

    /// Move every entry of `other` into this collector.
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
