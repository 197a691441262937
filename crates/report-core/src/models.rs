//! Normalized viewing-figure and schedule types.
//!
//! [`DailyRecord`] is the per-day output of extraction; [`PeriodSummary`]
//! is the aggregate a month (or a combination of months) reduces to;
//! [`ProgramEntry`] and [`ScheduleSet`] carry the program-schedule side.
//! Summaries are built once by the aggregators and never mutated after
//! construction; further aggregation always produces a new instance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Every day is tracked across exactly this many hour slots.
pub const HOURS_PER_DAY: usize = 24;

// ── AgeGroupEntry ─────────────────────────────────────────────────────────────

/// Viewer counts per age bracket for one hour of one day.
///
/// Brackets are cumulative by documented assumption (13+ ⊇ 50+ ⊇ 65+);
/// nothing enforces this for externally supplied data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroupEntry {
    /// Viewers aged 13 and over.
    #[serde(default)]
    pub viewers_13_plus: u64,
    /// Viewers aged 50 and over.
    #[serde(default)]
    pub viewers_50_plus: u64,
    /// Viewers aged 65 and over.
    #[serde(default)]
    pub viewers_65_plus: u64,
}

// ── DailyRecord ───────────────────────────────────────────────────────────────

/// One day's normalized viewing figures.
///
/// `hourly_viewers` and `hourly_percentages` always hold exactly 24 slots,
/// zero by default. A record is created during extraction, mutated only to
/// set an hour slot or to attach `programs`, and immutable thereafter. It
/// is owned by the [`PeriodSummary`] that contains it; combining summaries
/// copies records rather than aliasing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Canonical `DD-MM-YYYY` date key.
    pub date: String,
    /// Day-of-week label as found in (or derived for) the source row.
    pub day_of_week: String,
    /// Total viewers reported for the whole day.
    #[serde(default)]
    pub total_viewers: u64,
    /// Viewer count per hour slot 0-23.
    pub hourly_viewers: [u64; HOURS_PER_DAY],
    /// Fractional share of the daily total per hour slot 0-23.
    pub hourly_percentages: [f64; HOURS_PER_DAY],
    /// Per-hour age-bracket counts, when demographic data exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_groups: Option<Vec<AgeGroupEntry>>,
    /// Programs broadcast on this day, attached by the schedule merger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<ProgramEntry>>,
}

impl DailyRecord {
    /// Fresh record with all hour slots zeroed.
    pub fn new(date: impl Into<String>, day_of_week: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            day_of_week: day_of_week.into(),
            total_viewers: 0,
            hourly_viewers: [0; HOURS_PER_DAY],
            hourly_percentages: [0.0; HOURS_PER_DAY],
            age_groups: None,
            programs: None,
        }
    }

    /// Write one hour slot. A later write for the same hour replaces the
    /// earlier one; duplicate hour rows are not summed.
    pub fn set_hour(&mut self, hour: usize, viewers: u64, percentage: f64) {
        if hour < HOURS_PER_DAY {
            self.hourly_viewers[hour] = viewers;
            self.hourly_percentages[hour] = percentage;
        }
    }
}

// ── PeriodSummary ─────────────────────────────────────────────────────────────

/// Aggregate viewing figures for one period (a month, or several combined).
///
/// Invariants: `total_viewers` equals the sum of `days[*].total_viewers`;
/// `total_viewers_per_hour[h]` equals the sum of `days[*].hourly_viewers[h]`;
/// `peak_hour` is always a valid index selected by the tie-break policy in
/// the aggregator even when multiple hours tie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Human label, e.g. `"Januari 2024"` or `"Januari 2024 - Maart 2024"`.
    pub label: String,
    /// The days this summary was computed from, sorted by canonical date.
    pub days: Vec<DailyRecord>,
    /// Per-hour viewer average over all days (rounded).
    pub average_hourly_viewers: [u64; HOURS_PER_DAY],
    /// Per-hour maximum over all days.
    pub max_viewers_per_hour: [u64; HOURS_PER_DAY],
    /// Per-hour cumulative total over all days.
    pub total_viewers_per_hour: [u64; HOURS_PER_DAY],
    /// Per-hour age-bracket averages, present when any day carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_age_groups: Option<Vec<AgeGroupEntry>>,
    /// Per-hour age-bracket totals, present when any day carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_age_groups: Option<Vec<AgeGroupEntry>>,
    /// Date of the day with the largest total (first such day on ties).
    pub peak_day: String,
    /// Hour slot with the largest cumulative total, after tie-breaking.
    pub peak_hour: usize,
    /// Grand total across all days.
    pub total_viewers: u64,
}

impl PeriodSummary {
    /// Number of days the summary covers.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}

// ── ProgramEntry ──────────────────────────────────────────────────────────────

/// One scheduled program on one day.
///
/// Within a day's list, entries are chronologically ordered by `start_time`
/// (and by `sequence` when several entries share a slot). `end_time`, when
/// present, either equals the next entry's start or derives from `duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEntry {
    /// Stable identifier, when the source supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Program title, duration suffix stripped.
    pub title: String,
    /// Start time `HH:MM`.
    pub start_time: String,
    /// End time `HH:MM`, back-filled from the next entry or the duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Weekday label derived from the day column's canonical date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    /// `"Film"` or `"Serie"` when the title is prefixed accordingly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// `true` when the title marks the broadcast as a repeat.
    #[serde(default)]
    pub is_repeat: bool,
    /// Free-form annotation (e.g. shared-slot explanation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Order among entries sharing a (week, start-time) slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    /// ISO-style week number the entry belongs to, on multi-week sheets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    /// Decimal-like time reference found in the title when no duration was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_point: Option<String>,
}

impl ProgramEntry {
    /// Minimal entry with only title and start time set.
    pub fn new(title: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            start_time: start_time.into(),
            end_time: None,
            duration: None,
            day_of_week: None,
            category: None,
            is_repeat: false,
            notes: None,
            sequence: None,
            week: None,
            time_point: None,
        }
    }
}

// ── ScheduleSet ───────────────────────────────────────────────────────────────

/// A parsed program-schedule file: one or more weeks of day → programs.
///
/// Built once per schedule file and read-only afterward. The date map is
/// serialized as an explicit list of `(date, entries)` pairs so that
/// round-trips through the store preserve it exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSet {
    /// De-duplicated week numbers found in the sheet, in encounter order.
    #[serde(default)]
    pub week_numbers: Vec<u32>,
    /// Year used to expand `DD-MM` date tokens.
    pub reference_year: i32,
    /// Canonical date → chronologically ordered program list.
    #[serde(with = "date_program_pairs")]
    pub days_to_programs: BTreeMap<String, Vec<ProgramEntry>>,
}

impl ScheduleSet {
    /// Programs for a canonical date, if the schedule covers it.
    pub fn programs_for(&self, date: &str) -> Option<&[ProgramEntry]> {
        self.days_to_programs.get(date).map(|v| v.as_slice())
    }

    /// `true` when the schedule holds no days at all.
    pub fn is_empty(&self) -> bool {
        self.days_to_programs.is_empty()
    }
}

/// Serialize the date map as a list of `(date, entries)` pairs rather than
/// a native JSON object, for round-trip fidelity of the store format.
mod date_program_pairs {
    use super::ProgramEntry;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        map: &BTreeMap<String, Vec<ProgramEntry>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(&String, &Vec<ProgramEntry>)> = map.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<ProgramEntry>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(String, Vec<ProgramEntry>)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── DailyRecord ───────────────────────────────────────────────────────────

    #[test]
    fn test_daily_record_defaults() {
        let record = DailyRecord::new("15-01-2024", "maandag");
        assert_eq!(record.hourly_viewers.len(), HOURS_PER_DAY);
        assert_eq!(record.hourly_percentages.len(), HOURS_PER_DAY);
        assert!(record.hourly_viewers.iter().all(|&v| v == 0));
        assert_eq!(record.total_viewers, 0);
        assert!(record.age_groups.is_none());
        assert!(record.programs.is_none());
    }

    #[test]
    fn test_set_hour_overwrites() {
        let mut record = DailyRecord::new("15-01-2024", "maandag");
        record.set_hour(20, 1000, 0.10);
        record.set_hour(20, 2500, 0.25);
        assert_eq!(record.hourly_viewers[20], 2500);
        assert!((record.hourly_percentages[20] - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_hour_out_of_range_ignored() {
        let mut record = DailyRecord::new("15-01-2024", "maandag");
        record.set_hour(24, 1000, 0.10);
        assert!(record.hourly_viewers.iter().all(|&v| v == 0));
    }

    // ── ScheduleSet serialization ─────────────────────────────────────────────

    #[test]
    fn test_schedule_set_serializes_map_as_pairs() {
        let mut schedule = ScheduleSet {
            reference_year: 2024,
            ..Default::default()
        };
        schedule.days_to_programs.insert(
            "15-01-2024".to_string(),
            vec![ProgramEntry::new("Journaal", "20:00")],
        );

        let json = serde_json::to_value(&schedule).unwrap();
        let pairs = json["days_to_programs"].as_array().unwrap();
        assert_eq!(pairs.len(), 1);
        // Each element is a [date, entries] pair, not an object key.
        assert_eq!(pairs[0][0], "15-01-2024");
        assert_eq!(pairs[0][1][0]["title"], "Journaal");
    }

    #[test]
    fn test_schedule_set_round_trip() {
        let mut schedule = ScheduleSet {
            week_numbers: vec![3, 4],
            reference_year: 2024,
            ..Default::default()
        };
        let mut first = ProgramEntry::new("Journaal", "20:00");
        first.end_time = Some("20:30".to_string());
        let second = ProgramEntry::new("Weerbericht", "20:30");
        schedule
            .days_to_programs
            .insert("15-01-2024".to_string(), vec![first, second]);

        let json = serde_json::to_string(&schedule).unwrap();
        let back: ScheduleSet = serde_json::from_str(&json).unwrap();

        assert_eq!(back.week_numbers, vec![3, 4]);
        assert_eq!(back.reference_year, 2024);
        let programs = back.programs_for("15-01-2024").unwrap();
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].title, "Journaal");
        assert_eq!(programs[1].title, "Weerbericht");
    }

    #[test]
    fn test_daily_record_serde_round_trip() {
        let mut record = DailyRecord::new("15-01-2024", "maandag");
        record.total_viewers = 120_000;
        record.set_hour(20, 30_000, 0.25);

        let json = serde_json::to_string(&record).unwrap();
        let back: DailyRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.date, "15-01-2024");
        assert_eq!(back.total_viewers, 120_000);
        assert_eq!(back.hourly_viewers[20], 30_000);
    }
}
