//! Attaching schedule data onto daily viewing records.

use report_core::models::{DailyRecord, ScheduleSet};
use tracing::debug;

/// Joins program lists onto daily records by canonical date.
pub struct ScheduleMerger;

impl ScheduleMerger {
    /// Attach `programs` to every record whose date appears in the
    /// schedule. Records without a match keep `programs = None`; an empty
    /// schedule is a no-op.
    pub fn attach_programs(days: &mut [DailyRecord], schedule: &ScheduleSet) {
        if schedule.is_empty() {
            return;
        }

        let mut matched = 0usize;
        for record in days.iter_mut() {
            if let Some(programs) = schedule.programs_for(&record.date) {
                record.programs = Some(programs.to_vec());
                matched += 1;
            }
        }

        debug!(
            "Schedule merge: {} of {} day(s) matched",
            matched,
            days.len()
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
