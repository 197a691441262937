//! Program-schedule parsing.
//!
//! Weekly schedule sheets put weekday columns across the top, a dates row
//! below, and time rows down the left edge; multi-week sheets repeat week
//! declarations between blocks of time rows. The parser walks that layout
//! into a [`ScheduleSet`], then back-fills end times from adjacent start
//! times or explicit durations.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use report_core::dates::{is_weekday_name, DateNormalizer};
use report_core::error::{ReportError, Result};
use report_core::grid::{CellValue, RawGrid};
use report_core::models::{ProgramEntry, ScheduleSet};
use tracing::{debug, warn};

/// Rows scanned from the top for the sheet's year declaration.
const YEAR_SCAN_ROWS: usize = 8;

/// Placeholder cell marking "no program" in a day column.
const PLACEHOLDER: &str = "x";

/// Default duration for entries sharing a start slot.
const SHARED_SLOT_MINUTES: u32 = 15;

/// Default duration for the final entry of a day when nothing else is known.
const LAST_ENTRY_MINUTES: u32 = 60;

/// Title substrings marking a broadcast as a repeat.
const REPEAT_MARKERS: &[&str] = &["herhaling", "herh.", "repeat"];

// ── Day columns ───────────────────────────────────────────────────────────────

/// One weekday column of the sheet.
struct DayColumn {
    /// Weekday label from the header cell.
    name: String,
    /// Column index in the grid.
    column: usize,
    /// Canonical date from the dates row.
    date: String,
}

// ── ScheduleParser ────────────────────────────────────────────────────────────

/// Parses a weekly (possibly multi-week) schedule grid.
pub struct ScheduleParser;

impl ScheduleParser {
    /// Parse `grid` into a [`ScheduleSet`].
    ///
    /// `fallback_year` expands `DD-MM` date tokens when the sheet carries
    /// no four-digit year of its own. Fails with
    /// [`ReportError::NoDayColumns`] when no weekday header (or no
    /// resolvable dates row) is found.
    pub fn parse(grid: &RawGrid, label: &str, fallback_year: i32) -> Result<ScheduleSet> {
        // ── Step 1: week numbers and year ────────────────────────────────────
        let mut week_rows: Vec<(usize, u32)> = Vec::new();
        let mut week_numbers: Vec<u32> = Vec::new();
        let mut year: Option<i32> = None;

        for (idx, row) in grid.rows().enumerate() {
            if let Some(week) = Self::week_declaration(row) {
                week_rows.push((idx, week));
                if !week_numbers.contains(&week) {
                    week_numbers.push(week);
                }
            }
            if year.is_none() && idx < YEAR_SCAN_ROWS {
                year = Self::year_declaration(row);
            }
        }
        let reference_year = year.unwrap_or(fallback_year);

        // ── Step 2: weekday header and dates row ─────────────────────────────
        let (header_idx, weekday_columns) =
            Self::find_day_header(grid).ok_or_else(|| ReportError::NoDayColumns {
                label: label.to_string(),
            })?;
        let dates_row = header_idx + 1;

        let day_columns: Vec<DayColumn> = weekday_columns
            .into_iter()
            .filter_map(|(name, column)| {
                let cell = grid.cell(dates_row, column);
                let date = DateNormalizer::normalize_cell(cell).or_else(|| {
                    DateNormalizer::normalize_day_month(&cell.display_string(), reference_year)
                });
                match date {
                    Some(date) => Some(DayColumn { name, column, date }),
                    None => {
                        warn!(
                            "Schedule \"{}\": no date under day column \"{}\"",
                            label, name
                        );
                        None
                    }
                }
            })
            .collect();

        if day_columns.is_empty() {
            return Err(ReportError::NoDayColumns {
                label: label.to_string(),
            });
        }

        // ── Step 3: first time row; everything above is metadata/noise ───────
        let first_time_row = (dates_row + 1..grid.row_count())
            .find(|&idx| Self::parse_time_token(&grid.cell(idx, 0).display_string()).is_some());

        let mut days: BTreeMap<String, Vec<ProgramEntry>> = BTreeMap::new();
        let multi_week = week_numbers.len() > 1;

        // ── Step 4: entry construction ───────────────────────────────────────
        if let Some(first_time_row) = first_time_row {
            for row_idx in first_time_row..grid.row_count() {
                let token = grid.cell(row_idx, 0).display_string();
                let Some(start_time) = Self::parse_time_token(&token) else {
                    continue;
                };

                // The nearest week declaration above this row applies; with
                // a single-week sheet every entry gets that week.
                let week = if multi_week {
                    week_rows
                        .iter()
                        .rev()
                        .find(|(row, _)| *row <= row_idx)
                        .map(|(_, week)| *week)
                } else {
                    week_numbers.first().copied()
                };

                for day in &day_columns {
                    let cell = grid.cell(row_idx, day.column);
                    if !Self::is_program_cell(cell) {
                        continue;
                    }
                    let entry =
                        Self::build_entry(&cell.display_string(), &start_time, day, week);
                    days.entry(day.date.clone()).or_default().push(entry);
                }
            }
        }

        // ── Step 5: end-time back-fill ───────────────────────────────────────
        for entries in days.values_mut() {
            Self::backfill_end_times(entries);
        }

        debug!(
            "Schedule \"{}\": {} week(s), {} day(s), {} entries",
            label,
            week_numbers.len().max(1),
            days.len(),
            days.values().map(|v| v.len()).sum::<usize>()
        );

        Ok(ScheduleSet {
            week_numbers,
            reference_year,
            days_to_programs: days,
        })
    }

    // ── Sheet scanning ────────────────────────────────────────────────────────

    /// A week declaration is a row whose first cell starts with an integer
    /// token before a separator ("3 - maandag t/m zondag") or an explicit
    /// "week N" label.
    fn week_declaration(row: &[CellValue]) -> Option<u32> {
        let text = row.first()?.display_string();
        if text.is_empty() {
            return None;
        }

        let labelled = Regex::new(r"(?i)^week\s*(\d{1,2})\b").expect("regex is valid");
        if let Some(caps) = labelled.captures(&text) {
            return caps[1].parse().ok();
        }

        // Integer before a separator, not followed by another digit; that
        // keeps date tokens like "05-01" from reading as week 5.
        let bare = Regex::new(r"^(\d{1,2})\s*[-:]\s*(\D.*)?$").expect("regex is valid");
        bare.captures(&text).and_then(|caps| caps[1].parse().ok())
    }

    /// First four-digit year found anywhere in the row.
    fn year_declaration(row: &[CellValue]) -> Option<i32> {
        let year_re = Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("regex is valid");
        row.iter().find_map(|cell| {
            year_re
                .captures(&cell.display_string())
                .and_then(|caps| caps[1].parse().ok())
        })
    }

    /// First row containing recognizable weekday names, with the matching
    /// `(name, column)` pairs.
    fn find_day_header(grid: &RawGrid) -> Option<(usize, Vec<(String, usize)>)> {
        for (idx, row) in grid.rows().enumerate() {
            let columns: Vec<(String, usize)> = row
                .iter()
                .enumerate()
                .filter_map(|(col, cell)| {
                    let text = cell.display_string();
                    if is_weekday_name(&text) {
                        Some((text, col))
                    } else {
                        None
                    }
                })
                .collect();
            if !columns.is_empty() {
                return Some((idx, columns));
            }
        }
        None
    }

    /// Parse a schedule time token (`H,MM` / `H.MM` / `H:MM`) into
    /// canonical `HH:MM`, folding hours 24+ onto the clock.
    fn parse_time_token(token: &str) -> Option<String> {
        let time_re = Regex::new(r"^(\d{1,2})[.,:](\d{2})$").expect("regex is valid");
        let caps = time_re.captures(token.trim())?;
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if minute >= 60 {
            return None;
        }
        Some(format!("{:02}:{:02}", hour % 24, minute))
    }

    /// A day-column cell holds a program title only if it is not empty,
    /// not purely numeric, not the placeholder, and does not look like a
    /// date that leaked out of the dates row.
    fn is_program_cell(cell: &CellValue) -> bool {
        if cell.is_empty() || cell.as_number().is_some() {
            return false;
        }
        let text = cell.display_string();
        if text.eq_ignore_ascii_case(PLACEHOLDER) {
            return false;
        }
        if text.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        !DateNormalizer::looks_like_date(&text)
    }

    // ── Entry construction ────────────────────────────────────────────────────

    fn build_entry(
        raw_title: &str,
        start_time: &str,
        day: &DayColumn,
        week: Option<u32>,
    ) -> ProgramEntry {
        let (title, duration) = Self::extract_duration(raw_title);

        let mut entry = ProgramEntry::new(title.clone(), start_time);
        entry.duration = duration;
        entry.week = week;

        if duration.is_none() {
            entry.time_point = Self::extract_time_point(&title);
        }

        let lower = title.to_lowercase();
        entry.is_repeat = REPEAT_MARKERS.iter().any(|marker| lower.contains(marker));

        if lower.starts_with("film:") || lower.starts_with("film ") {
            entry.category = Some("Film".to_string());
        } else if lower.starts_with("serie:") || lower.starts_with("series:") {
            entry.category = Some("Serie".to_string());
        }

        entry.day_of_week = Some(
            DateNormalizer::parse_canonical(&day.date)
                .map(DateNormalizer::weekday_name)
                .unwrap_or_else(|| day.name.to_lowercase()),
        );

        entry
    }

    /// Split a duration annotation off the title: a parenthesized number
    /// first, then a trailing "N min(uten)" suffix.
    fn extract_duration(raw_title: &str) -> (String, Option<u32>) {
        let title = raw_title.trim();

        let parens = Regex::new(r"\((\d+)\)").expect("regex is valid");
        if let Some(caps) = parens.captures(title) {
            let duration = caps[1].parse().ok();
            let stripped = parens.replace(title, "").trim().to_string();
            return (stripped, duration);
        }

        let suffix = Regex::new(r"(?i)(\d+)\s*min(?:uten)?\.?\s*$").expect("regex is valid");
        if let Some(caps) = suffix.captures(title) {
            let duration = caps[1].parse().ok();
            let stripped = suffix.replace(title, "").trim().to_string();
            return (stripped, duration);
        }

        (title.to_string(), None)
    }

    /// A decimal-like token in the title ("aansluitend 22,30") is kept as
    /// a time reference when no duration was found.
    fn extract_time_point(title: &str) -> Option<String> {
        let point = Regex::new(r"\b(\d{1,2}[.,]\d{2})\b").expect("regex is valid");
        point.captures(title).map(|caps| caps[1].to_string())
    }

    // ── End-time back-fill ────────────────────────────────────────────────────

    /// One pass over a day's entry list.
    ///
    /// Entries sharing a (week, start-time) slot get sequence numbers, a
    /// note, and a 15-minute default duration. After sorting by
    /// (week, start, sequence), every entry except the last takes the next
    /// entry's start as its end (same-slot siblings use their duration
    /// instead); absent durations are derived from the start/end difference
    /// with a 24-hour correction across midnight. The day's final entry
    /// falls back to its duration, or to 60 minutes.
    fn backfill_end_times(entries: &mut Vec<ProgramEntry>) {
        if entries.is_empty() {
            return;
        }

        // Slot occupancy by (week, start time).
        let mut slot_counts: HashMap<(Option<u32>, String), u32> = HashMap::new();
        for entry in entries.iter() {
            *slot_counts
                .entry((entry.week, entry.start_time.clone()))
                .or_insert(0) += 1;
        }

        let mut seen: HashMap<(Option<u32>, String), u32> = HashMap::new();
        for entry in entries.iter_mut() {
            let key = (entry.week, entry.start_time.clone());
            if slot_counts[&key] > 1 {
                let sequence = seen.entry(key).or_insert(0);
                *sequence += 1;
                entry.sequence = Some(*sequence);
                if entry.duration.is_none() {
                    entry.duration = Some(SHARED_SLOT_MINUTES);
                }
                if *sequence > 1 && entry.notes.is_none() {
                    entry.notes = Some(format!(
                        "Shares time slot {} with an earlier entry",
                        entry.start_time
                    ));
                }
            }
        }

        entries.sort_by_key(|entry| {
            (
                entry.week.unwrap_or(0),
                Self::minutes_of(&entry.start_time),
                entry.sequence.unwrap_or(0),
            )
        });

        let len = entries.len();
        for idx in 0..len {
            let key = (entries[idx].week, entries[idx].start_time.clone());
            let shared = slot_counts[&key] > 1;

            if shared {
                let duration = entries[idx].duration.unwrap_or(SHARED_SLOT_MINUTES);
                entries[idx].end_time =
                    Some(Self::add_minutes(&entries[idx].start_time, duration));
            } else if idx + 1 < len {
                let next_start = entries[idx + 1].start_time.clone();
                if entries[idx].duration.is_none() {
                    entries[idx].duration = Some(Self::span_minutes(
                        &entries[idx].start_time,
                        &next_start,
                    ));
                }
                entries[idx].end_time = Some(next_start);
            }
        }

        // The day's final entry, unless a shared slot already closed it.
        if let Some(last) = entries.last_mut() {
            if last.end_time.is_none() {
                let duration = match last.duration {
                    Some(duration) => duration,
                    None => {
                        last.duration = Some(LAST_ENTRY_MINUTES);
                        LAST_ENTRY_MINUTES
                    }
                };
                last.end_time = Some(Self::add_minutes(&last.start_time, duration));
            }
        }
    }

    // ── Clock arithmetic ──────────────────────────────────────────────────────

    fn minutes_of(time: &str) -> u32 {
        let mut parts = time.splitn(2, ':');
        let hour: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minute: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        hour * 60 + minute
    }

    fn add_minutes(time: &str, minutes: u32) -> String {
        let total = (Self::minutes_of(time) + minutes) % (24 * 60);
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Minutes from `start` to `end`, adding a day when the span crosses
    /// midnight.
    fn span_minutes(start: &str, end: &str) -> u32 {
        let start = Self::minutes_of(start) as i32;
        let end = Self::minutes_of(end) as i32;
        let mut diff = end - start;
        if diff < 0 {
            diff += 24 * 60;
        }
        diff as u32
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
