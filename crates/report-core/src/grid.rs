//! The cell-grid input model.
//!
//! A [`RawGrid`] is what an external spreadsheet/CSV tokenizer hands the
//! pipeline: an ordered sequence of rows of heterogeneous cells. The core
//! never touches file bytes; everything downstream reads cells through the
//! accessors here and treats the grid as read-only.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── CellValue ─────────────────────────────────────────────────────────────────

/// A single spreadsheet cell as delivered by the tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Textual content, already trimmed of the tokenizer's quoting.
    Text(String),
    /// Any numeric cell, including date serial numbers.
    Number(f64),
    /// A cell the tokenizer recognized as a date/time.
    DateTime(NaiveDateTime),
    /// Blank cell.
    Empty,
}

impl CellValue {
    /// Borrow the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `true` for [`CellValue::Empty`] and for whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as the string a human would see in the sheet.
    ///
    /// Numbers drop a trailing `.0` so that `26.0` renders as `"26"`,
    /// matching how slot labels appear in the source exports.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::DateTime(dt) => dt.format("%d-%m-%Y").to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

// ── RawGrid ───────────────────────────────────────────────────────────────────

/// A two-dimensional cell grid, 0-indexed rows and columns.
///
/// Rows may have different lengths; out-of-bounds access returns
/// [`CellValue::Empty`] so that callers can probe candidate positions
/// without bounds bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct RawGrid {
    rows: Vec<Vec<CellValue>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Borrow a row, or `None` past the end.
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// The cell at `(row, col)`, or [`CellValue::Empty`] when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// `true` when the grid has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
