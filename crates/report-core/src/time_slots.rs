//! Time-slot token parsing.
//!
//! Ratings exports label each hour row with one of several slot encodings
//! ("02:00-02:59", "26-00", "2:00", "26", "20,15"). [`TimeSlotParser`]
//! collapses all of them onto an hour index 0-23. Slots labelled 24, 25 or
//! 26 belong to the first hours of the next broadcast day and fold onto
//! 0, 1 and 2.

use regex::Regex;

/// Parses raw time-slot tokens into hour indices.
pub struct TimeSlotParser;

impl TimeSlotParser {
    /// Parse a time-slot token into an hour in `[0, 23]`.
    ///
    /// Token shapes are tried in priority order, first match wins:
    /// 1. `HH:00-HH:59` (full slot range)
    /// 2. `HH-HH` (bare range)
    /// 3. `H:00` / `HH:00`
    /// 4. bare integer
    /// 5. `H,MM` / `H.MM` (decimal-style hour)
    ///
    /// The leading hour digits are extracted and parsed; hours 24-26 are
    /// reduced modulo 24. Returns `None` when no pattern matches or the
    /// hour falls outside `[0, 26]`; callers skip such rows rather than
    /// failing the whole file.
    pub fn parse_hour(token: &str) -> Option<u32> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        // Checked in priority order: the range forms must win over the
        // plain-hour forms so that "2:00-2:59" is not read as "2:00-...".
        let patterns = [
            Regex::new(r"^(\d{1,2}):\d{2}\s*-\s*\d{1,2}:\d{2}$").expect("regex is valid"),
            Regex::new(r"^(\d{1,2})\s*-\s*\d{1,2}$").expect("regex is valid"),
            Regex::new(r"^(\d{1,2}):\d{2}$").expect("regex is valid"),
            Regex::new(r"^(\d{1,2})$").expect("regex is valid"),
            Regex::new(r"^(\d{1,2})[.,]\d{1,2}$").expect("regex is valid"),
        ];

        for pattern in &patterns {
            if let Some(caps) = pattern.captures(token) {
                let hour: u32 = caps[1].parse().ok()?;
                return Self::fold_hour(hour);
            }
        }

        None
    }

    /// Map a parsed hour onto the 0-23 range.
    ///
    /// 24-26 represent the first hours of the next broadcast day and
    /// collapse onto 0-2. Hours 2-23 pass through unchanged even though
    /// some exports informally start their day at 02:00; no other shifting
    /// is applied.
    fn fold_hour(hour: u32) -> Option<u32> {
        match hour {
            0..=23 => Some(hour),
            24..=26 => Some(hour % 24),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Slot ranges ───────────────────────────────────────────────────────────

    #[test]
    fn test_full_slot_range() {
        assert_eq!(TimeSlotParser::parse_hour("02:00-02:59"), Some(2));
        assert_eq!(TimeSlotParser::parse_hour("23:00-23:59"), Some(23));
    }

    #[test]
    fn test_bare_range() {
        assert_eq!(TimeSlotParser::parse_hour("26-00"), Some(2));
        assert_eq!(TimeSlotParser::parse_hour("13-14"), Some(13));
    }

    #[test]
    fn test_range_with_spaces() {
        assert_eq!(TimeSlotParser::parse_hour("20:00 - 20:59"), Some(20));
        assert_eq!(TimeSlotParser::parse_hour("7 - 8"), Some(7));
    }

    // ── Plain hours ───────────────────────────────────────────────────────────

    #[test]
    fn test_colon_form() {
        assert_eq!(TimeSlotParser::parse_hour("2:00"), Some(2));
        assert_eq!(TimeSlotParser::parse_hour("14:00"), Some(14));
    }

    #[test]
    fn test_bare_integer() {
        assert_eq!(TimeSlotParser::parse_hour("0"), Some(0));
        assert_eq!(TimeSlotParser::parse_hour("19"), Some(19));
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!(TimeSlotParser::parse_hour("20,15"), Some(20));
        assert_eq!(TimeSlotParser::parse_hour("9.30"), Some(9));
    }

    // ── Next-day folding ──────────────────────────────────────────────────────

    #[test]
    fn test_overnight_hours_fold_modulo_24() {
        assert_eq!(TimeSlotParser::parse_hour("24:00-24:59"), Some(0));
        assert_eq!(TimeSlotParser::parse_hour("25:00"), Some(1));
        assert_eq!(TimeSlotParser::parse_hour("26"), Some(2));
    }

    #[test]
    fn test_hours_in_range_pass_through() {
        for h in 0..=23u32 {
            assert_eq!(TimeSlotParser::parse_hour(&h.to_string()), Some(h));
        }
    }

    // ── Rejections ────────────────────────────────────────────────────────────

    #[test]
    fn test_hour_above_26_rejected() {
        assert_eq!(TimeSlotParser::parse_hour("27"), None);
        assert_eq!(TimeSlotParser::parse_hour("99:00"), None);
    }

    #[test]
    fn test_unrecognized_tokens_rejected() {
        assert_eq!(TimeSlotParser::parse_hour(""), None);
        assert_eq!(TimeSlotParser::parse_hour("totaal"), None);
        assert_eq!(TimeSlotParser::parse_hour("n/a"), None);
        assert_eq!(TimeSlotParser::parse_hour("12:00:00-13:00"), None);
    }
}
