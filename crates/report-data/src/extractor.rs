//! Viewing-figure extraction from raw grids.
//!
//! Locates the header row in a loosely formatted export, resolves the data
//! columns, and turns the hour rows into one [`DailyRecord`] per distinct
//! date. Row-level anomalies are skipped; only a missing header aborts the
//! file.

use std::collections::HashMap;

use report_core::dates::DateNormalizer;
use report_core::demographics::AgeGroupModel;
use report_core::error::{ReportError, Result};
use report_core::grid::{CellValue, RawGrid};
use report_core::models::{AgeGroupEntry, DailyRecord, HOURS_PER_DAY};
use report_core::time_slots::TimeSlotParser;
use tracing::{debug, warn};

// ── Column markers ────────────────────────────────────────────────────────────

/// Literal first-three-cell markers identifying the header row.
/// Exact string match, not fuzzy; the exports are consistent about these.
const HEADER_DATE: &str = "Datum";
const HEADER_DAY: &str = "Dag";
const HEADER_SLOT: &str = "Tijdvak";

/// Header phrases matched as substrings to find the daily-total column.
const TOTAL_HEADER_PHRASES: &[&str] = &["kijkers totaal", "totaal kijkers", "dagtotaal"];

/// Header phrases matched as substrings to find the percentage column.
const PERCENT_HEADER_PHRASES: &[&str] = &["%", "percentage", "perc"];

/// Header phrases for the optional pre-calculated per-hour viewers column.
const CALCULATED_HEADER_PHRASES: &[&str] = &["berekend", "kijkers uur"];

/// Positional fallbacks when substring matching fails, tested in order;
/// the first in-bounds position wins. A best-effort heuristic inherited
/// from the source format; the order must not be changed.
const TOTAL_FALLBACK_COLUMNS: &[usize] = &[11, 9, 7];
const PERCENT_FALLBACK_COLUMNS: &[usize] = &[4, 3];

// ── ViewershipExtractor ───────────────────────────────────────────────────────

/// Turns a ratings grid into per-day records.
///
/// An optional [`AgeGroupModel`] synthesizes per-hour age brackets from the
/// hour's viewer count; without one, records carry no demographic data.
pub struct ViewershipExtractor {
    age_model: Option<Box<dyn AgeGroupModel>>,
}

impl ViewershipExtractor {
    /// Extractor without age-group synthesis.
    pub fn new() -> Self {
        Self { age_model: None }
    }

    /// Extractor that synthesizes age brackets with the given model.
    pub fn with_age_model(model: Box<dyn AgeGroupModel>) -> Self {
        Self {
            age_model: Some(model),
        }
    }

    /// Extract one [`DailyRecord`] per distinct date from `grid`.
    ///
    /// Steps:
    /// 1. Locate the header row (exact marker match on the first three
    ///    cells); fail with [`ReportError::HeaderNotFound`] otherwise.
    /// 2. Resolve the daily-total and percentage columns by header
    ///    substring, falling back to fixed candidate positions.
    /// 3. Walk the data rows, skipping anything short, empty, or
    ///    unparsable, and write each hour slot (last write per hour wins).
    /// 4. Drop days whose total is zero and sort the rest by date.
    pub fn extract_daily_records(&self, grid: &RawGrid, label: &str) -> Result<Vec<DailyRecord>> {
        let header_row = Self::find_header_row(grid).ok_or_else(|| ReportError::HeaderNotFound {
            label: label.to_string(),
        })?;

        let header = grid.row(header_row).unwrap_or(&[]);
        let total_col = Self::resolve_column(header, TOTAL_HEADER_PHRASES, TOTAL_FALLBACK_COLUMNS);
        let percent_col =
            Self::resolve_column(header, PERCENT_HEADER_PHRASES, PERCENT_FALLBACK_COLUMNS);
        let calculated_col = Self::find_column(header, CALCULATED_HEADER_PHRASES);

        let mut records: Vec<DailyRecord> = Vec::new();
        let mut index_by_date: HashMap<String, usize> = HashMap::new();
        let mut rows_read = 0u64;
        let mut rows_skipped = 0u64;

        for row_idx in header_row + 1..grid.row_count() {
            rows_read += 1;
            let Some(row) = grid.row(row_idx) else { continue };

            // Short rows and rows without a date or time slot carry no data.
            if row.len() < 3 || row[0].is_empty() || row[2].is_empty() {
                rows_skipped += 1;
                continue;
            }

            let Some(hour) = TimeSlotParser::parse_hour(&row[2].display_string()) else {
                rows_skipped += 1;
                continue;
            };
            let Some(date) = DateNormalizer::normalize_cell(&row[0]) else {
                rows_skipped += 1;
                continue;
            };

            let total_viewers = Self::numeric(grid.cell(row_idx, total_col)).max(0.0).round() as u64;

            let raw_percentage = Self::numeric(grid.cell(row_idx, percent_col));
            // Figures above 1 are whole-number percentages; the rest are
            // assumed already fractional.
            let percentage = if raw_percentage > 1.0 {
                raw_percentage / 100.0
            } else {
                raw_percentage
            };

            let computed = (percentage * total_viewers as f64).round() as u64;
            let viewers = match calculated_col {
                Some(col) => {
                    let supplied = Self::numeric(grid.cell(row_idx, col)).max(0.0).round() as u64;
                    // A supplied per-hour figure wins when non-zero; the
                    // percentage-based figure is the fallback.
                    if supplied > 0 {
                        supplied
                    } else {
                        computed
                    }
                }
                None => computed,
            };

            let record_idx = *index_by_date.entry(date.clone()).or_insert_with(|| {
                let day_of_week = Self::day_of_week_for(row, &date);
                records.push(DailyRecord::new(date.clone(), day_of_week));
                records.len() - 1
            });

            let record = &mut records[record_idx];
            record.total_viewers = total_viewers;
            record.set_hour(hour as usize, viewers, percentage);

            if let Some(model) = &self.age_model {
                let groups = record
                    .age_groups
                    .get_or_insert_with(|| vec![AgeGroupEntry::default(); HOURS_PER_DAY]);
                groups[hour as usize] = model.synthesize(hour, viewers);
            }
        }

        let day_count_before = records.len();
        records.retain(|r| r.total_viewers > 0);
        if records.len() < day_count_before {
            debug!(
                "Dropped {} zero-total day(s) from \"{}\"",
                day_count_before - records.len(),
                label
            );
        }

        crate::aggregator::sort_by_canonical_date(&mut records);

        debug!(
            "\"{}\": {} rows read, {} skipped, {} day(s)",
            label,
            rows_read,
            rows_skipped,
            records.len()
        );

        Ok(records)
    }

    // ── Header resolution ─────────────────────────────────────────────────────

    /// First row whose first three cells equal the literal column markers.
    fn find_header_row(grid: &RawGrid) -> Option<usize> {
        (0..grid.row_count()).find(|&idx| {
            let row = grid.row(idx).unwrap_or(&[]);
            row.len() >= 3
                && Self::cell_equals(&row[0], HEADER_DATE)
                && Self::cell_equals(&row[1], HEADER_DAY)
                && Self::cell_equals(&row[2], HEADER_SLOT)
        })
    }

    fn cell_equals(cell: &CellValue, marker: &str) -> bool {
        cell.as_text().map(|s| s.trim() == marker).unwrap_or(false)
    }

    /// Substring match against the header row, with positional fallback.
    fn resolve_column(header: &[CellValue], phrases: &[&str], fallbacks: &[usize]) -> usize {
        if let Some(col) = Self::find_column(header, phrases) {
            return col;
        }

        let fallback = fallbacks
            .iter()
            .copied()
            .find(|&col| col < header.len())
            .unwrap_or(fallbacks[0]);
        warn!(
            "No header matched {:?}; falling back to column {}",
            phrases, fallback
        );
        fallback
    }

    /// First column whose header text contains any of `phrases`.
    fn find_column(header: &[CellValue], phrases: &[&str]) -> Option<usize> {
        header.iter().position(|cell| {
            cell.as_text()
                .map(|text| {
                    let lower = text.to_lowercase();
                    phrases.iter().any(|phrase| lower.contains(phrase))
                })
                .unwrap_or(false)
        })
    }

    // ── Row helpers ───────────────────────────────────────────────────────────

    /// Day-of-week label: the row's own cell when present, else derived
    /// from the canonical date.
    fn day_of_week_for(row: &[CellValue], date: &str) -> String {
        if let Some(text) = row[1].as_text() {
            if !text.trim().is_empty() {
                return text.trim().to_string();
            }
        }
        DateNormalizer::parse_canonical(date)
            .map(DateNormalizer::weekday_name)
            .unwrap_or_default()
    }

    /// Numeric reading of a cell: numbers pass through, text is parsed
    /// with comma decimals tolerated, everything else is 0.
    fn numeric(cell: &CellValue) -> f64 {
        match cell {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

impl Default for ViewershipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
