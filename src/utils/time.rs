//! Time utilities: timestamp storage format, parsing HH:MM[:SS], "now" in UTC.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Storage format for slot timestamps. SQLite's DATE()/TIME() understand it
/// and lexical order equals chronological order.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).ok()
}

/// Current UTC time truncated to whole seconds, the precision we store.
pub fn now_utc() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .ok()
}

pub fn parse_time_on(date: NaiveDate, t: &str) -> AppResult<NaiveDateTime> {
    let time = parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))?;
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_format_round_trips_and_sorts_lexically() {
        let a = parse_ts("2025-03-01 09:05:00").unwrap();
        let b = parse_ts("2025-03-01 10:00:00").unwrap();
        assert_eq!(format_ts(&a), "2025-03-01 09:05:00");
        assert!(format_ts(&a) < format_ts(&b));
    }

    #[test]
    fn parse_time_accepts_minutes_and_seconds() {
        assert_eq!(
            parse_time("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_time("09:30:15"),
            NaiveTime::from_hms_opt(9, 30, 15)
        );
        assert!(parse_time("9h30").is_none());
    }

    #[test]
    fn now_has_no_subsecond_part() {
        assert_eq!(now_utc().nanosecond(), 0);
    }
}
