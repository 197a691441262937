//! Period aggregation over daily viewing records.
//!
//! [`MonthAggregator`] reduces one file's day list to a [`PeriodSummary`];
//! [`MultiPeriodAggregator`] merges several summaries by re-running the
//! same per-hour algorithm over the union of their days. Averaging the
//! already-aggregated numbers instead would bias the mean toward longer
//! periods, so it is never done for viewer figures; only the age-group
//! averages are recombined from stored aggregates (weighted by day count),
//! because per-day demographic detail does not survive aggregation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use report_core::dates::DateNormalizer;
use report_core::models::{AgeGroupEntry, DailyRecord, PeriodSummary, HOURS_PER_DAY};
use tracing::warn;

/// Hour indices considered prime-time for the peak-hour tie-break.
const EVENING_HOURS: std::ops::RangeInclusive<usize> = 18..=23;

// ── MonthAggregator ───────────────────────────────────────────────────────────

/// Reduces a sorted day list into a period summary.
pub struct MonthAggregator;

impl MonthAggregator {
    /// Build the summary for one period.
    ///
    /// Per hour: totals are summed, maxima taken, and averages computed as
    /// `round(total / day_count)` (0 when there are no days). `peak_day`
    /// is the date of the day with the largest total (first on ties);
    /// `peak_hour` follows [`select_peak_hour`].
    pub fn summarize(label: &str, days: Vec<DailyRecord>) -> PeriodSummary {
        aggregate_days(label.to_string(), days)
    }
}

// ── MultiPeriodAggregator ─────────────────────────────────────────────────────

/// Combines several period summaries into one.
pub struct MultiPeriodAggregator;

impl MultiPeriodAggregator {
    /// Merge `summaries` into a single combined summary.
    ///
    /// Returns `None` for an empty input and a clone for a single input.
    /// Otherwise the days of all inputs are unioned by canonical date
    /// (later inputs silently overwrite duplicate dates; an input-quality
    /// assumption, logged but not surfaced) and the monthly algorithm is
    /// re-run over the union. Age-group totals are summed across inputs;
    /// age-group averages are recombined by weighting each input's stored
    /// average with its day count before dividing by the combined count.
    pub fn combine(summaries: &[PeriodSummary]) -> Option<PeriodSummary> {
        match summaries {
            [] => None,
            [single] => Some(single.clone()),
            _ => Some(Self::combine_many(summaries)),
        }
    }

    fn combine_many(summaries: &[PeriodSummary]) -> PeriodSummary {
        // Union by canonical date, last source wins.
        let mut by_date: BTreeMap<String, DailyRecord> = BTreeMap::new();
        for summary in summaries {
            for day in &summary.days {
                if by_date.contains_key(&day.date) {
                    warn!(
                        "Duplicate date {} across periods; keeping the later source",
                        day.date
                    );
                }
                by_date.insert(day.date.clone(), day.clone());
            }
        }

        let mut days: Vec<DailyRecord> = by_date.into_values().collect();
        sort_by_canonical_date(&mut days);

        let label = format!(
            "{} - {}",
            summaries.first().map(|s| s.label.as_str()).unwrap_or(""),
            summaries.last().map(|s| s.label.as_str()).unwrap_or("")
        );

        let combined_day_count = days.len();
        let mut combined = aggregate_days(label, days);

        // Age groups: recombine from the stored per-period aggregates.
        let with_ages: Vec<&PeriodSummary> = summaries
            .iter()
            .filter(|s| s.average_age_groups.is_some() || s.total_age_groups.is_some())
            .collect();

        if with_ages.is_empty() {
            combined.average_age_groups = None;
            combined.total_age_groups = None;
            return combined;
        }

        let mut totals = vec![AgeGroupEntry::default(); HOURS_PER_DAY];
        let mut weighted = vec![(0f64, 0f64, 0f64); HOURS_PER_DAY];
        for summary in &with_ages {
            let day_count = summary.day_count() as f64;
            if let Some(period_totals) = &summary.total_age_groups {
                for (hour, entry) in period_totals.iter().enumerate().take(HOURS_PER_DAY) {
                    totals[hour].viewers_13_plus += entry.viewers_13_plus;
                    totals[hour].viewers_50_plus += entry.viewers_50_plus;
                    totals[hour].viewers_65_plus += entry.viewers_65_plus;
                }
            }
            if let Some(averages) = &summary.average_age_groups {
                for (hour, entry) in averages.iter().enumerate().take(HOURS_PER_DAY) {
                    weighted[hour].0 += entry.viewers_13_plus as f64 * day_count;
                    weighted[hour].1 += entry.viewers_50_plus as f64 * day_count;
                    weighted[hour].2 += entry.viewers_65_plus as f64 * day_count;
                }
            }
        }

        let averages: Vec<AgeGroupEntry> = weighted
            .iter()
            .map(|(v13, v50, v65)| {
                if combined_day_count == 0 {
                    AgeGroupEntry::default()
                } else {
                    let n = combined_day_count as f64;
                    AgeGroupEntry {
                        viewers_13_plus: (v13 / n).round() as u64,
                        viewers_50_plus: (v50 / n).round() as u64,
                        viewers_65_plus: (v65 / n).round() as u64,
                    }
                }
            })
            .collect();

        combined.total_age_groups = Some(totals);
        combined.average_age_groups = Some(averages);
        combined
    }
}

// ── Shared aggregation ────────────────────────────────────────────────────────

/// The per-hour total/max/average/peak algorithm shared by both
/// aggregators; multi-period combination re-runs this over the unioned
/// day set rather than merging pre-aggregated figures.
fn aggregate_days(label: String, days: Vec<DailyRecord>) -> PeriodSummary {
    let day_count = days.len();

    let mut total_viewers_per_hour = [0u64; HOURS_PER_DAY];
    let mut max_viewers_per_hour = [0u64; HOURS_PER_DAY];
    for day in &days {
        for hour in 0..HOURS_PER_DAY {
            total_viewers_per_hour[hour] += day.hourly_viewers[hour];
            max_viewers_per_hour[hour] = max_viewers_per_hour[hour].max(day.hourly_viewers[hour]);
        }
    }

    let mut average_hourly_viewers = [0u64; HOURS_PER_DAY];
    if day_count > 0 {
        for hour in 0..HOURS_PER_DAY {
            average_hourly_viewers[hour] =
                (total_viewers_per_hour[hour] as f64 / day_count as f64).round() as u64;
        }
    }

    // First day with the strictly largest total wins.
    let mut peak_day = String::new();
    let mut peak_day_total = 0u64;
    for day in &days {
        if peak_day.is_empty() || day.total_viewers > peak_day_total {
            peak_day = day.date.clone();
            peak_day_total = day.total_viewers;
        }
    }

    let peak_hour = if day_count == 0 {
        0
    } else {
        select_peak_hour(&total_viewers_per_hour)
    };

    let total_viewers: u64 = days.iter().map(|d| d.total_viewers).sum();

    let (total_age_groups, average_age_groups) = aggregate_age_groups(&days);

    PeriodSummary {
        label,
        average_hourly_viewers,
        max_viewers_per_hour,
        total_viewers_per_hour,
        average_age_groups,
        total_age_groups,
        peak_day,
        peak_hour,
        total_viewers,
        days,
    }
}

/// Peak-hour selection with the documented tie-break.
///
/// All hours achieving the maximum cumulative total are collected; when
/// any tied hour falls in the evening range the latest such hour wins,
/// otherwise the latest tied hour overall.
fn select_peak_hour(totals: &[u64; HOURS_PER_DAY]) -> usize {
    let max_total = totals.iter().copied().max().unwrap_or(0);
    let tied: Vec<usize> = (0..HOURS_PER_DAY)
        .filter(|&hour| totals[hour] == max_total)
        .collect();

    tied.iter()
        .copied()
        .filter(|hour| EVENING_HOURS.contains(hour))
        .max()
        .or_else(|| tied.iter().copied().max())
        .unwrap_or(0)
}

/// Sum-then-divide age-group aggregation over day-level detail.
/// Returns `(None, None)` when no day carries age data.
fn aggregate_age_groups(
    days: &[DailyRecord],
) -> (Option<Vec<AgeGroupEntry>>, Option<Vec<AgeGroupEntry>>) {
    if !days.iter().any(|d| d.age_groups.is_some()) {
        return (None, None);
    }

    let day_count = days.len() as f64;
    let mut totals = vec![AgeGroupEntry::default(); HOURS_PER_DAY];
    for day in days {
        let Some(groups) = &day.age_groups else { continue };
        for (hour, entry) in groups.iter().enumerate().take(HOURS_PER_DAY) {
            totals[hour].viewers_13_plus += entry.viewers_13_plus;
            totals[hour].viewers_50_plus += entry.viewers_50_plus;
            totals[hour].viewers_65_plus += entry.viewers_65_plus;
        }
    }

    let averages: Vec<AgeGroupEntry> = totals
        .iter()
        .map(|entry| AgeGroupEntry {
            viewers_13_plus: (entry.viewers_13_plus as f64 / day_count).round() as u64,
            viewers_50_plus: (entry.viewers_50_plus as f64 / day_count).round() as u64,
            viewers_65_plus: (entry.viewers_65_plus as f64 / day_count).round() as u64,
        })
        .collect();

    (Some(totals), Some(averages))
}

/// Ascending canonical-date sort; unparsable dates keep their relative
/// order (stable sort, Equal on parse failure).
pub(crate) fn sort_by_canonical_date(days: &mut [DailyRecord]) {
    days.sort_by(|a, b| {
        match (
            DateNormalizer::parse_canonical(&a.date),
            DateNormalizer::parse_canonical(&b.date),
        ) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        }
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, total: u64, hours: &[(usize, u64)]) -> DailyRecord {
        let mut record = DailyRecord::new(date, "maandag");
        record.total_viewers = total;
        for &(hour, viewers) in hours {
            record.set_hour(hour, viewers, 0.0);
        }
        record
    }

    // ── MonthAggregator invariants ────────────────────────────────────────────

    #[test]
    fn test_totals_match_day_sums() {
        let days = vec![
            day("15-01-2024", 100_000, &[(20, 30_000), (21, 10_000)]),
            day("16-01-2024", 80_000, &[(20, 20_000), (8, 5_000)]),
        ];
        let summary = MonthAggregator::summarize("Januari 2024", days);

        assert_eq!(summary.total_viewers, 180_000);
        assert_eq!(summary.total_viewers_per_hour[20], 50_000);
        assert_eq!(summary.total_viewers_per_hour[21], 10_000);
        assert_eq!(summary.total_viewers_per_hour[8], 5_000);
        for hour in 0..HOURS_PER_DAY {
            let expected: u64 = summary.days.iter().map(|d| d.hourly_viewers[hour]).sum();
            assert_eq!(summary.total_viewers_per_hour[hour], expected);
        }
    }

    #[test]
    fn test_averages_and_maxima() {
        let days = vec![
            day("15-01-2024", 100_000, &[(20, 30_000)]),
            day("16-01-2024", 80_000, &[(20, 20_000)]),
        ];
        let summary = MonthAggregator::summarize("t", days);

        assert_eq!(summary.average_hourly_viewers[20], 25_000);
        assert_eq!(summary.max_viewers_per_hour[20], 30_000);
        // Odd division rounds, not truncates.
        let days = vec![
            day("15-01-2024", 1, &[(9, 1)]),
            day("16-01-2024", 1, &[(9, 2)]),
        ];
        let summary = MonthAggregator::summarize("t", days);
        assert_eq!(summary.average_hourly_viewers[9], 2); // round(1.5)
    }

    #[test]
    fn test_peak_day_first_on_tie() {
        let days = vec![
            day("15-01-2024", 90_000, &[(20, 1)]),
            day("16-01-2024", 90_000, &[(20, 1)]),
        ];
        let summary = MonthAggregator::summarize("t", days);
        assert_eq!(summary.peak_day, "15-01-2024");
    }

    #[test]
    fn test_empty_period() {
        let summary = MonthAggregator::summarize("Leeg", vec![]);
        assert!(summary.days.is_empty());
        assert_eq!(summary.total_viewers, 0);
        assert_eq!(summary.peak_hour, 0);
        assert_eq!(summary.peak_day, "");
        assert!(summary.average_hourly_viewers.iter().all(|&v| v == 0));
    }

    // ── Peak-hour tie-break ───────────────────────────────────────────────────

    #[test]
    fn test_peak_hour_three_way_tie_prefers_latest_evening() {
        let mut totals = [0u64; HOURS_PER_DAY];
        totals[11] = 100;
        totals[20] = 100;
        totals[22] = 100;
        assert_eq!(select_peak_hour(&totals), 22);
    }

    #[test]
    fn test_peak_hour_no_evening_tie_takes_latest_overall() {
        let mut totals = [0u64; HOURS_PER_DAY];
        totals[9] = 100;
        totals[14] = 100;
        assert_eq!(select_peak_hour(&totals), 14);
    }

    #[test]
    fn test_peak_hour_single_maximum() {
        let mut totals = [0u64; HOURS_PER_DAY];
        totals[7] = 500;
        totals[20] = 400;
        assert_eq!(select_peak_hour(&totals), 7);
    }

    // ── MultiPeriodAggregator ─────────────────────────────────────────────────

    #[test]
    fn test_combine_empty_is_none() {
        assert!(MultiPeriodAggregator::combine(&[]).is_none());
    }

    #[test]
    fn test_combine_single_returned_unchanged() {
        let summary =
            MonthAggregator::summarize("Januari 2024", vec![day("15-01-2024", 100, &[(20, 50)])]);
        let combined = MultiPeriodAggregator::combine(std::slice::from_ref(&summary)).unwrap();
        assert_eq!(combined.label, "Januari 2024");
        assert_eq!(combined.total_viewers, summary.total_viewers);
    }

    #[test]
    fn test_combine_matches_from_scratch_aggregation() {
        // Two disjoint single-day periods; combining must equal a fresh
        // aggregation over both days, not a re-average of the averages.
        let day_a = day("15-01-2024", 100_000, &[(20, 30_000), (9, 8_000)]);
        let day_b = day("15-02-2024", 60_000, &[(20, 10_000), (9, 2_000)]);

        let first = MonthAggregator::summarize("Januari 2024", vec![day_a.clone()]);
        let second = MonthAggregator::summarize("Februari 2024", vec![day_b.clone()]);
        let combined = MultiPeriodAggregator::combine(&[first, second]).unwrap();

        let fresh = MonthAggregator::summarize("x", vec![day_a, day_b]);

        assert_eq!(combined.total_viewers_per_hour[20], 40_000);
        assert_eq!(combined.average_hourly_viewers[20], 20_000);
        assert_eq!(
            combined.total_viewers_per_hour,
            fresh.total_viewers_per_hour
        );
        assert_eq!(
            combined.average_hourly_viewers,
            fresh.average_hourly_viewers
        );
        assert_eq!(combined.max_viewers_per_hour, fresh.max_viewers_per_hour);
        assert_eq!(combined.total_viewers, fresh.total_viewers);
        assert_eq!(combined.peak_hour, fresh.peak_hour);
    }

    #[test]
    fn test_combine_label_spans_first_and_last() {
        let first = MonthAggregator::summarize("Januari 2024", vec![day("15-01-2024", 1, &[])]);
        let second = MonthAggregator::summarize("Maart 2024", vec![day("15-03-2024", 1, &[])]);
        let combined = MultiPeriodAggregator::combine(&[first, second]).unwrap();
        assert_eq!(combined.label, "Januari 2024 - Maart 2024");
    }

    #[test]
    fn test_combine_duplicate_date_last_source_wins() {
        let first = MonthAggregator::summarize(
            "Januari 2024",
            vec![day("15-01-2024", 100_000, &[(20, 30_000)])],
        );
        let second = MonthAggregator::summarize(
            "Januari herzien",
            vec![day("15-01-2024", 90_000, &[(20, 25_000)])],
        );
        let combined = MultiPeriodAggregator::combine(&[first, second]).unwrap();

        assert_eq!(combined.day_count(), 1);
        assert_eq!(combined.total_viewers, 90_000);
        assert_eq!(combined.total_viewers_per_hour[20], 25_000);
    }

    #[test]
    fn test_combine_days_sorted_chronologically() {
        // Lexicographic ordering of DD-MM-YYYY would put 01-02 before
        // 15-01; chronological sorting must not.
        let first = MonthAggregator::summarize(
            "Februari 2024",
            vec![day("01-02-2024", 100, &[(20, 10)])],
        );
        let second = MonthAggregator::summarize(
            "Januari 2024",
            vec![day("15-01-2024", 200, &[(20, 20)])],
        );
        let combined = MultiPeriodAggregator::combine(&[first, second]).unwrap();

        assert_eq!(combined.days[0].date, "15-01-2024");
        assert_eq!(combined.days[1].date, "01-02-2024");
    }

    // ── Age groups ────────────────────────────────────────────────────────────

    fn day_with_ages(date: &str, total: u64, hour: usize, v13: u64, v50: u64, v65: u64) -> DailyRecord {
        let mut record = day(date, total, &[(hour, v13)]);
        let mut groups = vec![AgeGroupEntry::default(); HOURS_PER_DAY];
        groups[hour] = AgeGroupEntry {
            viewers_13_plus: v13,
            viewers_50_plus: v50,
            viewers_65_plus: v65,
        };
        record.age_groups = Some(groups);
        record
    }

    #[test]
    fn test_month_age_group_totals_and_averages() {
        let days = vec![
            day_with_ages("15-01-2024", 100, 20, 1_000, 400, 100),
            day_with_ages("16-01-2024", 100, 20, 3_000, 600, 300),
        ];
        let summary = MonthAggregator::summarize("t", days);

        let totals = summary.total_age_groups.as_ref().unwrap();
        assert_eq!(totals[20].viewers_13_plus, 4_000);
        assert_eq!(totals[20].viewers_50_plus, 1_000);

        let averages = summary.average_age_groups.as_ref().unwrap();
        assert_eq!(averages[20].viewers_13_plus, 2_000);
        assert_eq!(averages[20].viewers_65_plus, 200);
    }

    #[test]
    fn test_month_without_age_data_has_none() {
        let summary = MonthAggregator::summarize("t", vec![day("15-01-2024", 1, &[])]);
        assert!(summary.total_age_groups.is_none());
        assert!(summary.average_age_groups.is_none());
    }

    #[test]
    fn test_combine_age_totals_summed_averages_weighted() {
        // Period A: 2 days, avg 1000 @ hour 20. Period B: 1 day, avg 400.
        let a_days = vec![
            day_with_ages("15-01-2024", 100, 20, 1_200, 500, 100),
            day_with_ages("16-01-2024", 100, 20, 800, 300, 100),
        ];
        let b_days = vec![day_with_ages("15-02-2024", 100, 20, 400, 200, 40)];

        let first = MonthAggregator::summarize("Januari 2024", a_days);
        let second = MonthAggregator::summarize("Februari 2024", b_days);

        let combined = MultiPeriodAggregator::combine(&[first, second]).unwrap();

        // Totals sum across inputs: 2000 + 400.
        let totals = combined.total_age_groups.as_ref().unwrap();
        assert_eq!(totals[20].viewers_13_plus, 2_400);

        // Averages recombine weighted by day count:
        // (1000 * 2 + 400 * 1) / 3 = 800.
        let averages = combined.average_age_groups.as_ref().unwrap();
        assert_eq!(averages[20].viewers_13_plus, 800);
    }
}
