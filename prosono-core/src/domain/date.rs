//! Survey date and time-of-day formats
//!
//! Dates are entered day-month-year with hyphens (display format) and sent to
//! the backend year-month-day (wire format). Conversion between the two is a
//! pure token reorder; calendar validity is not checked at this layer, only
//! the fixed pattern (two-digit day 01-31, two-digit month 01-12, four-digit
//! year) at form-input time.

use chrono::Local;
use regex::Regex;

use crate::domain::result::{Error, Result};

/// Validate a display-format date (`DD-MM-YYYY`)
pub fn validate_display_date(date: &str) -> Result<()> {
    let re = Regex::new(r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[0-2])-([0-9]{4})$").unwrap();
    if re.is_match(date) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Invalid date: {date}. Use DD-MM-YYYY (e.g. 25-12-2024)."
        )))
    }
}

/// Convert a display-format date (`DD-MM-YYYY`) to wire format (`YYYY-MM-DD`)
///
/// Format validation happens at the form layer; a string that does not split
/// into three tokens is returned unchanged.
pub fn to_wire_date(display: &str) -> String {
    reorder(display)
}

/// Convert a wire-format date (`YYYY-MM-DD`) back to display format
pub fn to_display_date(wire: &str) -> String {
    reorder(wire)
}

fn reorder(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [a, b, c] => format!("{c}-{b}-{a}"),
        _ => date.to_string(),
    }
}

/// Today's date in display format
pub fn today_display() -> String {
    Local::now().format("%d-%m-%Y").to_string()
}

/// Validate an `HH:MM` time-of-day and return it zero-padded
///
/// Accepts single-digit hours ("8:30" becomes "08:30"). Hours must be 0-23
/// and minutes 0-59; anything else returns `None`.
pub fn normalize_time(time: &str) -> Option<String> {
    let (hours, minutes) = time.split_once(':')?;
    if hours.is_empty() || minutes.is_empty() {
        return None;
    }

    let parsed_hours: u32 = hours.parse().ok()?;
    let parsed_minutes: u32 = minutes.parse().ok()?;
    if parsed_hours > 23 || parsed_minutes > 59 {
        return None;
    }

    Some(format!("{parsed_hours:02}:{parsed_minutes:02}"))
}

/// Convert an `HH:MM` duration to total minutes (hours x 60 + minutes)
///
/// This is a duration, not a time of day, so there is no rounding or
/// calendar arithmetic involved.
pub fn duration_to_minutes(duration: &str) -> Option<u32> {
    let normalized = normalize_time(duration)?;
    let (hours, minutes) = normalized.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_to_wire() {
        assert_eq!(to_wire_date("25-12-2024"), "2024-12-25");
        assert_eq!(to_wire_date("01-02-2023"), "2023-02-01");
    }

    #[test]
    fn test_wire_to_display() {
        assert_eq!(to_display_date("2024-12-25"), "25-12-2024");
    }

    #[test]
    fn test_date_round_trip() {
        for date in ["01-01-2024", "31-12-1999", "15-06-2025", "29-02-2024"] {
            assert_eq!(to_display_date(&to_wire_date(date)), date);
        }
    }

    #[test]
    fn test_reorder_leaves_malformed_input_unchanged() {
        assert_eq!(to_wire_date("garbage"), "garbage");
        assert_eq!(to_wire_date("25/12/2024"), "25/12/2024");
    }

    #[test]
    fn test_validate_display_date() {
        assert!(validate_display_date("25-12-2024").is_ok());
        assert!(validate_display_date("01-01-2000").is_ok());
        assert!(validate_display_date("31-12-1999").is_ok());

        // Wrong order, separators, or out-of-pattern tokens
        assert!(validate_display_date("2024-12-25").is_err());
        assert!(validate_display_date("32-01-2024").is_err());
        assert!(validate_display_date("00-01-2024").is_err());
        assert!(validate_display_date("25-13-2024").is_err());
        assert!(validate_display_date("25-00-2024").is_err());
        assert!(validate_display_date("5-12-2024").is_err());
        assert!(validate_display_date("25-12-24").is_err());
        assert!(validate_display_date("").is_err());
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("07:30").as_deref(), Some("07:30"));
        assert_eq!(normalize_time("8:05").as_deref(), Some("08:05"));
        assert_eq!(normalize_time("23:59").as_deref(), Some("23:59"));
        assert_eq!(normalize_time("0:0").as_deref(), Some("00:00"));

        assert_eq!(normalize_time("24:00"), None);
        assert_eq!(normalize_time("12:60"), None);
        assert_eq!(normalize_time("1230"), None);
        assert_eq!(normalize_time(":30"), None);
        assert_eq!(normalize_time("12:"), None);
        assert_eq!(normalize_time("ab:cd"), None);
        assert_eq!(normalize_time(""), None);
    }

    #[test]
    fn test_duration_to_minutes() {
        assert_eq!(duration_to_minutes("08:15"), Some(495));
        assert_eq!(duration_to_minutes("00:00"), Some(0));
        assert_eq!(duration_to_minutes("23:59"), Some(1439));
        assert_eq!(duration_to_minutes("7:45"), Some(465));
        assert_eq!(duration_to_minutes("25:00"), None);
    }

    #[test]
    fn test_today_display_shape() {
        let today = today_display();
        assert!(validate_display_date(&today).is_ok());
    }
}
