//! Filename-derived period labels.
//!
//! Source files are named after the month they cover
//! ("Kijkcijfers Januari 2024.xlsx"); the label feeds straight into the
//! extractor and the combined-summary naming. This is boundary logic, not
//! part of the grid pipeline.

use regex::Regex;

/// Label used when no month name can be found in the filename.
pub const UNKNOWN_MONTH: &str = "Unknown Month";

/// Month names matched as substrings of the filename, in display casing.
const LABEL_MONTHS: &[&str] = &[
    "Januari",
    "Februari",
    "Maart",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Augustus",
    "September",
    "Oktober",
    "November",
    "December",
];

/// Derive a human period label ("Maart 2024") from a source filename.
///
/// The month comes from case-insensitive substring matching against the
/// fixed month-name table; the year from the first 4-digit run. Missing
/// year yields the bare month name; missing month yields
/// [`UNKNOWN_MONTH`] regardless of any year present.
pub fn label_from_filename(name: &str) -> String {
    let lower = name.to_lowercase();

    let month = LABEL_MONTHS
        .iter()
        .find(|m| lower.contains(&m.to_lowercase()));

    let Some(month) = month else {
        return UNKNOWN_MONTH.to_string();
    };

    let year_re = Regex::new(r"(\d{4})").expect("regex is valid");
    match year_re.captures(name) {
        Some(caps) => format!("{} {}", month, &caps[1]),
        None => (*month).to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
