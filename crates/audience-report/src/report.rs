//! Plain-text rendering of period summaries.
//!
//! The charting layer lives elsewhere; the CLI only prints a compact
//! per-hour table with the headline figures.

use report_core::models::{PeriodSummary, HOURS_PER_DAY};

/// Render one summary as a text block.
pub fn render_summary(summary: &PeriodSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", summary.label));
    out.push_str(&format!("{}\n", "=".repeat(summary.label.len().max(8))));
    out.push_str(&format!(
        "Days: {}   Total viewers: {}   Peak day: {}   Peak hour: {:02}:00\n\n",
        summary.day_count(),
        summary.total_viewers,
        summary.peak_day,
        summary.peak_hour
    ));

    out.push_str("Hour   Total        Average      Max\n");
    for hour in 0..HOURS_PER_DAY {
        // Hours with no viewing at all stay out of the table.
        if summary.total_viewers_per_hour[hour] == 0 {
            continue;
        }
        out.push_str(&format!(
            "{:02}:00  {:<12} {:<12} {:<12}\n",
            hour,
            summary.total_viewers_per_hour[hour],
            summary.average_hourly_viewers[hour],
            summary.max_viewers_per_hour[hour]
        ));
    }

    let with_programs = summary
        .days
        .iter()
        .filter(|d| d.programs.is_some())
        .count();
    if with_programs > 0 {
        out.push_str(&format!(
            "\nSchedule attached for {} of {} day(s)\n",
            with_programs,
            summary.day_count()
        ));
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
