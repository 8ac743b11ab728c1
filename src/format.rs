use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDate};

const FALLBACK_FORMAT: &str = "%Y-%m-%d";

/// Shown for dates the server sent that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Formats a task date for display. Plain `YYYY-MM-DD` values are calendar
/// dates and are shown as-is; full RFC 3339 timestamps are converted to the
/// local timezone first.
pub fn display_date(raw: &str, format: &str) -> String {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Local).date_naive())
    });

    match date {
        Some(date) => {
            let mut out = String::new();
            // chrono reports bad format strings as a fmt::Error
            if write!(out, "{}", date.format(format)).is_err() {
                log::warn!("invalid date format '{}', using {}", format, FALLBACK_FORMAT);
                return date.format(FALLBACK_FORMAT).to_string();
            }
            out
        }
        None => INVALID_DATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_dates_do_not_shift() {
        assert_eq!(display_date("2024-01-05", "%-m/%-d/%Y"), "1/5/2024");
        assert_eq!(display_date("2024-12-31", "%d.%m.%Y"), "31.12.2024");
    }

    #[test]
    fn timestamps_are_accepted() {
        let shown = display_date("2024-06-15T12:00:00Z", "%Y");
        assert_eq!(shown, "2024");
    }

    #[test]
    fn bad_format_string_falls_back() {
        assert_eq!(display_date("2024-01-05", "%Q"), "2024-01-05");
    }

    #[test]
    fn garbage_is_reported_as_invalid() {
        assert_eq!(display_date("next tuesday", "%-m/%-d/%Y"), INVALID_DATE);
    }
}
