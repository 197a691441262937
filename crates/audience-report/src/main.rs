mod bootstrap;
mod cli;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use report_core::models::PeriodSummary;
use report_data::aggregator::MultiPeriodAggregator;
use report_data::merger::ScheduleMerger;
use report_data::{analysis, reader};
use report_store::store::{SCHEDULE_KEY, SUMMARIES_KEY};
use report_store::DataStore;

fn main() -> Result<()> {
    let settings = cli::Settings::parse();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Audience Report v{} starting", env!("CARGO_PKG_VERSION"));

    let store = match &settings.store_dir {
        Some(dir) => DataStore::new(dir),
        None => DataStore::default_location(),
    };

    if settings.clear_store {
        store.clear(SUMMARIES_KEY)?;
        store.clear(SCHEDULE_KEY)?;
        println!("Store cleared.");
        return Ok(());
    }

    if settings.load {
        return show_stored(&store, settings.combine);
    }

    // ── Resolve inputs ────────────────────────────────────────────────────────
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in &settings.inputs {
        if input.is_dir() {
            paths.extend(reader::find_spreadsheet_files(input));
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        anyhow::bail!("no input files given (pass files or a directory)");
    }

    // ── Ingest, continuing past per-file failures ─────────────────────────────
    let outcome = analysis::ingest_ratings_batch(&paths);
    for (path, err) in &outcome.failures {
        eprintln!("warning: {}: {}", path.display(), err);
    }
    if outcome.summaries.is_empty() {
        anyhow::bail!("all {} input file(s) failed", outcome.failures.len());
    }
    let mut summaries = outcome.summaries;

    // ── Optional schedule merge ───────────────────────────────────────────────
    let mut schedule = None;
    if let Some(schedule_path) = &settings.schedule {
        let year = settings
            .year
            .unwrap_or_else(|| chrono::Local::now().year());
        match analysis::ingest_schedule_file(schedule_path, year) {
            Ok(parsed) => {
                for summary in &mut summaries {
                    ScheduleMerger::attach_programs(&mut summary.days, &parsed);
                }
                schedule = Some(parsed);
            }
            Err(err) => {
                eprintln!("warning: {}: {}", schedule_path.display(), err);
            }
        }
    }

    // ── Output ────────────────────────────────────────────────────────────────
    for summary in &summaries {
        print!("{}", report::render_summary(summary));
    }
    print_combined(&summaries, settings.combine);

    if settings.save {
        store.save(SUMMARIES_KEY, &summaries)?;
        if let Some(parsed) = &schedule {
            store.save(SCHEDULE_KEY, parsed)?;
        }
        println!(
            "\nSaved {} period(s) to {}",
            summaries.len(),
            store.root().display()
        );
    }

    Ok(())
}

/// Print previously stored summaries instead of ingesting anything new.
fn show_stored(store: &DataStore, combine: bool) -> Result<()> {
    let summaries: Vec<PeriodSummary> = store.load(SUMMARIES_KEY)?.unwrap_or_default();
    if summaries.is_empty() {
        println!("No stored results.");
        return Ok(());
    }

    for summary in &summaries {
        print!("{}", report::render_summary(summary));
    }
    print_combined(&summaries, combine);
    Ok(())
}

/// Render the multi-period aggregate when requested and meaningful.
fn print_combined(summaries: &[PeriodSummary], combine: bool) {
    if combine && summaries.len() > 1 {
        if let Some(combined) = MultiPeriodAggregator::combine(summaries) {
            print!("{}", report::render_summary(&combined));
        }
    }
}
