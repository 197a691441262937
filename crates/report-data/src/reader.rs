//! Spreadsheet discovery and grid tokenization.
//!
//! Turns `.csv` files (via the `csv` crate) and binary spreadsheet formats
//! (via `calamine`) into the [`RawGrid`] cell model. This is the only place
//! that touches file bytes; everything downstream consumes the grid.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use report_core::error::{ReportError, Result};
use report_core::grid::{CellValue, RawGrid};
use tracing::{debug, warn};

/// File extensions the reader knows how to tokenize.
const SPREADSHEET_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "xlsb", "ods"];

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find all spreadsheet files recursively under `dir`, sorted by path.
pub fn find_spreadsheet_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Tokenize one file into a [`RawGrid`], dispatching on its extension.
pub fn load_grid(path: &Path) -> Result<RawGrid> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let grid = match ext.as_str() {
        "csv" => load_csv_grid(path)?,
        "xlsx" | "xls" | "xlsb" | "ods" => load_workbook_grid(path)?,
        _ => return Err(ReportError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(
        "Loaded {} rows from {}",
        grid.row_count(),
        path.display()
    );
    Ok(grid)
}

/// Read a CSV file into a grid. No header handling; rows may have
/// different lengths.
fn load_csv_grid(path: &Path) -> Result<RawGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReportError::Spreadsheet(e.to_string()))?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReportError::Spreadsheet(e.to_string()))?;
        rows.push(record.iter().map(parse_csv_cell).collect());
    }

    Ok(RawGrid::new(rows))
}

/// Read the first worksheet of a binary spreadsheet into a grid.
fn load_workbook_grid(path: &Path) -> Result<RawGrid> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ReportError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::Spreadsheet(format!("{}: no worksheets", path.display())))?
        .map_err(|e| ReportError::Spreadsheet(e.to_string()))?;

    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(convert_workbook_cell).collect())
        .collect();

    Ok(RawGrid::new(rows))
}

// ── Cell conversion ───────────────────────────────────────────────────────────

/// Map one CSV field to a cell value.
///
/// Blank fields become [`CellValue::Empty`]; fields that parse as a float
/// become numbers; everything else stays text. Comma-decimal tokens like
/// `"20,15"` deliberately stay text so the slot/time parsers see them.
fn parse_csv_cell(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return CellValue::Number(number);
    }
    CellValue::Text(trimmed.to_string())
}

/// Map one calamine cell to a cell value.
fn convert_workbook_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
