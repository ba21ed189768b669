use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::OPEN_MINUTES;

lazy_static! {
    /// Clock times as sent by clients: "8", "8:00", "08:30".
    /// Minute is optional and defaults to zero.
    static ref CLOCK_TIME_REGEX: Regex = Regex::new(r"^(\d{1,2})(?::(\d{1,2}))?$").unwrap();
}

/// Parse a normalized `HH:MM` string into minutes since midnight.
///
/// Returns `None` on any non-numeric component; callers treat that as a hard
/// validation failure.
pub fn time_to_minutes(text: &str) -> Option<i32> {
    let (hour_part, minute_part) = text.split_once(':')?;
    let hour: i32 = hour_part.parse().ok()?;
    let minute: i32 = minute_part.parse().ok()?;
    Some(hour * 60 + minute)
}

/// Inverse of [`time_to_minutes`], zero-padded.
pub fn minutes_to_time(total_minutes: i32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Canonicalize an hour/minute pair into `HH:MM`.
pub fn normalize_time(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}

/// Canonicalize a raw time string from a request into `HH:MM`.
///
/// A missing minute component defaults to zero, so "8" becomes "08:00".
pub fn normalize_time_text(text: &str) -> Option<String> {
    let captures = CLOCK_TIME_REGEX.captures(text.trim())?;
    let hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minute: u32 = captures
        .get(2)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    Some(normalize_time(hour, minute))
}

/// A start is valid when it lies on the service's own grid relative to the
/// opening time. Services of different durations use independent grids.
pub fn is_slot_aligned(start_minutes: i32, duration_minutes: i32) -> bool {
    duration_minutes > 0 && (start_minutes - OPEN_MINUTES) % duration_minutes == 0
}

/// Combine a calendar day and an `HH:MM` string into a naive datetime.
///
/// Returns `None` when the time does not parse or names an impossible clock
/// reading; temporal checks skip such values and let the business-hours
/// validation reject them.
pub fn appointment_date_time(date: NaiveDate, time: &str) -> Option<NaiveDateTime> {
    let minutes = time_to_minutes(time)?;
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    date.and_hms_opt(minutes as u32 / 60, minutes as u32 % 60, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_minutes() {
        assert_eq!(time_to_minutes("08:00"), Some(480));
        assert_eq!(time_to_minutes("15:30"), Some(930));
        assert_eq!(time_to_minutes("00:00"), Some(0));
    }

    #[test]
    fn test_time_to_minutes_rejects_garbage() {
        assert_eq!(time_to_minutes("8"), None);
        assert_eq!(time_to_minutes("ab:cd"), None);
        assert_eq!(time_to_minutes("08:xx"), None);
        assert_eq!(time_to_minutes(""), None);
    }

    #[test]
    fn test_minutes_to_time_round_trip() {
        assert_eq!(minutes_to_time(480), "08:00");
        assert_eq!(minutes_to_time(935), "15:35");
        assert_eq!(time_to_minutes(&minutes_to_time(605)), Some(605));
    }

    #[test]
    fn test_normalize_time_text() {
        assert_eq!(normalize_time_text("8:00"), Some("08:00".to_string()));
        assert_eq!(normalize_time_text("8"), Some("08:00".to_string()));
        assert_eq!(normalize_time_text("08:5"), Some("08:05".to_string()));
        assert_eq!(normalize_time_text("nope"), None);
        assert_eq!(normalize_time_text("8:00:00"), None);
    }

    #[test]
    fn test_slot_alignment_uses_service_grid() {
        // 30-minute grid from 08:00
        assert!(is_slot_aligned(480, 30));
        assert!(is_slot_aligned(510, 30));
        assert!(!is_slot_aligned(495, 30));
        // 45-minute grid is independent of the 30-minute one
        assert!(is_slot_aligned(525, 45));
        assert!(!is_slot_aligned(510, 45));
    }

    #[test]
    fn test_appointment_date_time() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let dt = appointment_date_time(date, "08:30").unwrap();
        assert_eq!(dt.to_string(), "2026-06-01 08:30:00");
        assert_eq!(appointment_date_time(date, "25:00"), None);
        assert_eq!(appointment_date_time(date, "bogus"), None);
    }
}
