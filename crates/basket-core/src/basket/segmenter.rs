//! Partitioning a lot sheet's row stream into lots.

use regex::Regex;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Location};
use crate::inference::rules::values::parse_quantity;
use crate::models::grid::{cell_at, Cell};

use super::columns::ColumnLayout;
use super::vendor::LotBoundary;

/// One line item inside a lot.
#[derive(Debug, Clone, PartialEq)]
pub struct LotItem {
    /// 0-based row index in the sheet.
    pub row: usize,
    pub part_number: Option<String>,
    pub label: Option<String>,
    pub description: String,
    pub quantity: u32,
}

/// A lot as found in the sheet: its heading, the cells of its opening row
/// and its items in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedLot {
    pub heading: String,
    pub row: usize,
    pub cells: Vec<Cell>,
    pub items: Vec<LotItem>,
}

impl SegmentedLot {
    fn open(heading: String, row: usize, cells: &[Cell]) -> Self {
        Self {
            heading,
            row,
            cells: cells.to_vec(),
            items: Vec::new(),
        }
    }
}

enum SegmenterState {
    NoActiveLot,
    ActiveLot(SegmentedLot),
}

/// Row-by-row lot segmentation. `finish` consumes the segmenter, so the
/// open lot is flushed exactly once.
pub struct LotSegmenter<'a> {
    layout: &'a ColumnLayout,
    boundary: LotBoundary,
    marker: &'a Regex,
    sheet: &'a str,
    state: SegmenterState,
    lots: Vec<SegmentedLot>,
    diagnostics: Diagnostics,
}

impl<'a> LotSegmenter<'a> {
    pub fn new(layout: &'a ColumnLayout, boundary: LotBoundary, marker: &'a Regex, sheet: &'a str) -> Self {
        Self {
            layout,
            boundary,
            marker,
            sheet,
            state: SegmenterState::NoActiveLot,
            lots: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Feed one data row; `index` is its 0-based position in the sheet.
    pub fn feed(&mut self, index: usize, row: &[Cell]) {
        if row.iter().all(Cell::is_blank) {
            return;
        }
        match self.boundary {
            LotBoundary::HeadingColumn => self.feed_heading_column(index, row),
            LotBoundary::MarkerRow => self.feed_marker_row(index, row),
        }
    }

    /// Flush the open lot and return every lot with the collected diagnostics.
    pub fn finish(mut self) -> (Vec<SegmentedLot>, Diagnostics) {
        self.flush();
        (self.lots, self.diagnostics)
    }

    /// Feed every row after the layout's header row.
    pub fn segment(mut self, rows: &[Vec<Cell>]) -> (Vec<SegmentedLot>, Diagnostics) {
        let start = self.layout.data_start();
        for (index, row) in rows.iter().enumerate().skip(start) {
            self.feed(index, row);
        }
        self.finish()
    }

    fn text(&self, row: &[Cell], col: Option<usize>) -> Option<String> {
        col.and_then(|c| cell_at(row, c).as_text())
    }

    fn has_price(&self, row: &[Cell]) -> bool {
        self.layout
            .prices
            .iter()
            .any(|p| !cell_at(row, p.index).is_blank())
    }

    fn item(&self, index: usize, row: &[Cell]) -> Option<LotItem> {
        let part_number = self.text(row, self.layout.part_number);
        let label = self.text(row, self.layout.label);
        let description = self.text(row, self.layout.description);
        if part_number.is_none() && description.is_none() {
            return None;
        }
        Some(LotItem {
            row: index,
            part_number,
            label,
            description: description.unwrap_or_default(),
            quantity: parse_quantity(self.text(row, self.layout.quantity).as_deref()),
        })
    }

    fn active_heading(&self) -> Option<&str> {
        match &self.state {
            SegmenterState::ActiveLot(lot) => Some(lot.heading.as_str()),
            SegmenterState::NoActiveLot => None,
        }
    }

    fn flush(&mut self) {
        if let SegmenterState::ActiveLot(lot) = std::mem::replace(&mut self.state, SegmenterState::NoActiveLot) {
            debug!(
                "Flushing lot '{}' (row {}) with {} items",
                lot.heading,
                lot.row + 1,
                lot.items.len()
            );
            self.lots.push(lot);
        }
    }

    fn open(&mut self, heading: String, index: usize, row: &[Cell]) {
        self.flush();
        self.state = SegmenterState::ActiveLot(SegmentedLot::open(heading, index, row));
    }

    fn append(&mut self, item: LotItem) {
        match &mut self.state {
            SegmenterState::ActiveLot(lot) => lot.items.push(item),
            SegmenterState::NoActiveLot => self.diagnostics.warning(
                DiagnosticKind::OrphanRow,
                Location::row(self.sheet, item.row),
                format!("item '{}' appears before any lot heading", item.description),
            ),
        }
    }

    fn feed_heading_column(&mut self, index: usize, row: &[Cell]) {
        let heading = self.text(row, self.layout.heading);
        let item = self
            .item(index, row)
            .filter(|item| !item.description.is_empty());

        if let Some(heading) = heading {
            if self.active_heading() != Some(heading.as_str()) {
                self.open(heading, index, row);
            }
        }
        if let Some(item) = item {
            self.append(item);
        }
    }

    fn feed_marker_row(&mut self, index: usize, row: &[Cell]) {
        let part_number = self.text(row, self.layout.part_number);
        let description = self.text(row, self.layout.description);
        let has_price = self.has_price(row);
        let marked = description
            .as_deref()
            .is_some_and(|d| self.marker.is_match(d));
        let location = Location::row(self.sheet, index);

        match (part_number.is_some(), description, marked, has_price) {
            (false, Some(heading), true, true) => self.open(heading, index, row),
            (true, _, true, true) => {
                self.diagnostics.warning(
                    DiagnosticKind::AmbiguousLotBoundary,
                    location,
                    "row has a part number and a lot marker with a price; kept as a configuration",
                );
                if let Some(item) = self.item(index, row) {
                    self.append(item);
                }
            }
            (true, _, _, _) => {
                if let Some(item) = self.item(index, row) {
                    self.append(item);
                }
            }
            (false, Some(description), false, true) => {
                let kept = matches!(self.state, SegmenterState::ActiveLot(_));
                self.diagnostics.warning(
                    DiagnosticKind::AmbiguousLotBoundary,
                    location,
                    if kept {
                        format!("priced row '{}' has no part number or lot marker; kept as a configuration", description)
                    } else {
                        format!("priced row '{}' has no part number or lot marker and no open lot; dropped", description)
                    },
                );
                if kept {
                    if let Some(item) = self.item(index, row) {
                        self.append(item);
                    }
                }
            }
            (false, Some(description), true, false) => {
                self.diagnostics.warning(
                    DiagnosticKind::AmbiguousLotBoundary,
                    location,
                    format!("lot marker '{}' has no price; no lot opened", description),
                );
            }
            _ => {}
        }
    }
}
