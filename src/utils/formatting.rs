//! Formatting utilities used for CLI outputs.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Split seconds into (hours, minutes, seconds).
pub fn seconds_to_hh_mm_ss(seconds: i64) -> (i64, i64, i64) {
    let s = seconds.max(0);
    (s / 3600, s % 3600 / 60, s % 60)
}

/// `H:MM:SS`, hours right-aligned to two characters.
pub fn seconds_to_str(seconds: i64) -> String {
    let (hh, mm, ss) = seconds_to_hh_mm_ss(seconds);
    format!("{:>2}:{:02}:{:02}", hh, mm, ss)
}

pub fn duration_to_str(d: Duration) -> String {
    seconds_to_str(d.num_seconds())
}

fn to_local(ts: &NaiveDateTime) -> NaiveDateTime {
    Utc.from_utc_datetime(ts).with_timezone(&Local).naive_local()
}

/// Render a stored UTC timestamp in the user's local time zone.
pub fn local_ts(ts: &NaiveDateTime) -> String {
    to_local(ts).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Calendar day of a stored UTC timestamp as the user sees it.
pub fn local_date(ts: &NaiveDateTime) -> NaiveDate {
    to_local(ts).date()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_render_as_clock() {
        assert_eq!(seconds_to_str(0), " 0:00:00");
        assert_eq!(seconds_to_str(3725), " 1:02:05");
        assert_eq!(seconds_to_str(36_000), "10:00:00");
        assert_eq!(seconds_to_str(-5), " 0:00:00");
    }

    #[test]
    fn local_date_matches_the_printed_timestamp() {
        for raw in ["2025-01-01 00:30:00", "2025-06-30 23:45:00", "2025-03-15 12:00:00"] {
            let ts = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap();
            let shown = local_ts(&ts);
            assert_eq!(local_date(&ts).format("%Y-%m-%d").to_string(), shown[..10]);
        }
    }
}
