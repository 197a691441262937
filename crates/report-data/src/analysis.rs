//! Per-file ingestion pipeline.
//!
//! Ties the reader, extractor and aggregator together: one ratings file in,
//! one [`PeriodSummary`] out. Batch processing records per-file failures
//! and keeps going, so one bad export never aborts its siblings.

use std::path::{Path, PathBuf};

use report_core::demographics::TimeOfDayModel;
use report_core::error::{ReportError, Result};
use report_core::labels::label_from_filename;
use report_core::models::{PeriodSummary, ScheduleSet};
use tracing::{debug, warn};

use crate::aggregator::MonthAggregator;
use crate::extractor::ViewershipExtractor;
use crate::reader;
use crate::schedule::ScheduleParser;

// ── BatchOutcome ──────────────────────────────────────────────────────────────

/// Result of ingesting a set of ratings files.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One summary per successfully processed file, in input order.
    pub summaries: Vec<PeriodSummary>,
    /// Files that failed, with the failure that stopped them.
    pub failures: Vec<(PathBuf, ReportError)>,
}

// ── Ratings ingestion ─────────────────────────────────────────────────────────

/// Ingest one ratings export into a period summary.
///
/// The period label is derived from the filename. Age brackets are
/// synthesized with the default time-of-day model since the exports carry
/// no demographic detail. A file that parses but yields zero usable days
/// is raised as [`ReportError::EmptyInput`] so batch callers can report
/// it alongside the other per-file failures.
pub fn ingest_ratings_file(path: &Path) -> Result<PeriodSummary> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let label = label_from_filename(file_name);

    let start = std::time::Instant::now();
    let grid = reader::load_grid(path)?;

    let extractor = ViewershipExtractor::with_age_model(Box::new(TimeOfDayModel));
    let days = extractor.extract_daily_records(&grid, &label)?;
    if days.is_empty() {
        return Err(ReportError::EmptyInput { label });
    }

    let summary = MonthAggregator::summarize(&label, days);

    debug!(
        "Ingested \"{}\" ({} days, {} viewers) in {:.3}s",
        summary.label,
        summary.day_count(),
        summary.total_viewers,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// Ingest every path in order, collecting failures instead of propagating
/// them.
pub fn ingest_ratings_batch(paths: &[PathBuf]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for path in paths {
        match ingest_ratings_file(path) {
            Ok(summary) => outcome.summaries.push(summary),
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                outcome.failures.push((path.clone(), err));
            }
        }
    }

    outcome
}

// ── Schedule ingestion ────────────────────────────────────────────────────────

/// Ingest one program-schedule export.
///
/// `fallback_year` is used when the sheet declares no year of its own.
pub fn ingest_schedule_file(path: &Path, fallback_year: i32) -> Result<ScheduleSet> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let grid = reader::load_grid(path)?;
    ScheduleParser::parse(&grid, file_name, fallback_year)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
