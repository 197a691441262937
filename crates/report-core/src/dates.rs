//! Date normalization for spreadsheet cells and schedule tokens.
//!
//! Every date in the pipeline is keyed by the canonical `DD-MM-YYYY` string.
//! Source material encodes dates three ways: spreadsheet serial numbers,
//! tokenizer-recognized date cells, and locale strings; schedule sheets add
//! short `DD-MM` / `DD-Mon` tokens that need a reference year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use tracing::debug;

use crate::grid::CellValue;

// ── Name tables ───────────────────────────────────────────────────────────────

/// Weekday names recognized in schedule headers and date-likeness checks.
/// Dutch first (the export language), English second.
pub const WEEKDAY_NAMES: &[&str] = &[
    "maandag",
    "dinsdag",
    "woensdag",
    "donderdag",
    "vrijdag",
    "zaterdag",
    "zondag",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Month-name table: `(name, month number)`. Full Dutch and English names
/// plus the three-letter abbreviations that appear in `DD-Mon` tokens.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("october", 10),
    ("jan", 1),
    ("feb", 2),
    ("mrt", 3),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("okt", 10),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Resolve a month name or abbreviation (case-insensitive) to 1-12.
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, m)| *m)
}

/// `true` when `token` is a recognized weekday name (case-insensitive).
pub fn is_weekday_name(token: &str) -> bool {
    let lower = token.trim().to_lowercase();
    WEEKDAY_NAMES.contains(&lower.as_str())
}

// ── DateNormalizer ────────────────────────────────────────────────────────────

/// Spreadsheet date serial numbers count days from this epoch.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial values outside this window are not treated as dates. 60 is
/// 1900-02-28 in serial terms; anything below cannot be a ratings date,
/// and the upper bound keeps plain measurements from masquerading as dates.
const SERIAL_RANGE: std::ops::Range<f64> = 60.0..80000.0;

/// String formats tried, in order, for locale date strings.
const DATE_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d-%m-%y",
    "%d/%m/%y",
];

/// Converts the various date encodings into canonical `DD-MM-YYYY` strings.
pub struct DateNormalizer;

impl DateNormalizer {
    /// Canonical string for a [`NaiveDate`].
    pub fn canonical(date: NaiveDate) -> String {
        date.format("%d-%m-%Y").to_string()
    }

    /// Parse a canonical `DD-MM-YYYY` string back into a [`NaiveDate`].
    pub fn parse_canonical(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), "%d-%m-%Y").ok()
    }

    /// Normalize a spreadsheet date cell into canonical form.
    ///
    /// Handles, in this order:
    /// * tokenizer-recognized date cells,
    /// * numeric cells holding a date serial number,
    /// * locale strings (see [`DATE_FORMATS`]).
    ///
    /// Returns `None` for anything else; callers skip the row.
    pub fn normalize_cell(cell: &CellValue) -> Option<String> {
        match cell {
            CellValue::DateTime(dt) => Some(Self::canonical(dt.date())),
            CellValue::Number(n) => Self::from_serial(*n).map(Self::canonical),
            CellValue::Text(s) => Self::normalize_str(s),
            CellValue::Empty => None,
        }
    }

    /// Normalize a locale date string into canonical form.
    pub fn normalize_str(s: &str) -> Option<String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(Self::canonical(date));
            }
        }

        debug!("DateNormalizer: unrecognized date string \"{}\"", trimmed);
        None
    }

    /// Normalize a schedule date token (`DD-MM` or `DD-Mon`) given the
    /// sheet's reference year.
    pub fn normalize_day_month(token: &str, year: i32) -> Option<String> {
        let trimmed = token.trim();

        // Numeric day-month: "05-01", "5/1".
        let numeric = Regex::new(r"^(\d{1,2})[-/](\d{1,2})$").expect("regex is valid");
        if let Some(caps) = numeric.captures(trimmed) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day).map(Self::canonical);
        }

        // Day plus month name: "5-jan", "05 mrt", "12-Okt.".
        let named = Regex::new(r"^(\d{1,2})[-/ ]([A-Za-z]+)\.?$").expect("regex is valid");
        if let Some(caps) = named.captures(trimmed) {
            let day: u32 = caps[1].parse().ok()?;
            let month = month_from_name(&caps[2])?;
            return NaiveDate::from_ymd_opt(year, month, day).map(Self::canonical);
        }

        None
    }

    /// Dutch weekday name for a date ("maandag" .. "zondag").
    pub fn weekday_name(date: NaiveDate) -> String {
        let name = match date.weekday() {
            Weekday::Mon => "maandag",
            Weekday::Tue => "dinsdag",
            Weekday::Wed => "woensdag",
            Weekday::Thu => "donderdag",
            Weekday::Fri => "vrijdag",
            Weekday::Sat => "zaterdag",
            Weekday::Sun => "zondag",
        };
        name.to_string()
    }

    /// `true` when a schedule cell looks like a date rather than a program
    /// title: numeric date patterns, weekday names, or month names.
    pub fn looks_like_date(token: &str) -> bool {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return false;
        }

        let numeric = Regex::new(r"^\d{1,2}[-/.]\d{1,2}([-/.]\d{2,4})?$").expect("regex is valid");
        if numeric.is_match(trimmed) {
            return true;
        }

        let lower = trimmed.to_lowercase();
        if is_weekday_name(&lower) {
            return true;
        }

        // "5 jan", "12-okt", a bare month name, or "maandag 5-1".
        lower
            .split(|c: char| c == ' ' || c == '-' || c == '/')
            .filter(|part| !part.is_empty())
            .all(|part| {
                month_from_name(part).is_some()
                    || is_weekday_name(part)
                    || part.chars().all(|c| c.is_ascii_digit())
            })
            && lower.chars().any(|c| c.is_alphabetic())
    }

    /// Convert a spreadsheet serial number into a date.
    ///
    /// Serial day 0 is 1899-12-30; the fractional part (time of day) is
    /// discarded. Values outside [`SERIAL_RANGE`] are rejected.
    fn from_serial(serial: f64) -> Option<NaiveDate> {
        if !SERIAL_RANGE.contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(SERIAL_EPOCH.0, SERIAL_EPOCH.1, SERIAL_EPOCH.2)?;
        epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
