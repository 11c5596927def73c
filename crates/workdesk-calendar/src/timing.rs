//! Start/end defaults and drag snapping for new events.
//!
//! Views work in the user's wall-clock time (`NaiveDateTime`); `to_instant`
//! converts to a stored instant.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

const QUARTER_MINUTES: u32 = 15;

/// Round to the nearest quarter hour by whole minutes.
///
/// A remainder under 7.5 minutes rounds down, otherwise up; seconds are
/// dropped. A time already on a quarter hour is returned unchanged.
pub fn snap_to_quarter_hour(time: NaiveDateTime) -> NaiveDateTime {
    let remainder = time.minute() % QUARTER_MINUTES;
    if remainder == 0 {
        return time;
    }

    let minute_start = time
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time);
    let floor = minute_start - Duration::minutes(i64::from(remainder));

    if remainder * 2 < QUARTER_MINUTES {
        floor
    } else {
        floor + Duration::minutes(i64::from(QUARTER_MINUTES))
    }
}

/// Next full hour strictly after `now`.
pub fn default_start(now: NaiveDateTime) -> NaiveDateTime {
    let hour_start = now.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(now.hour()));
    hour_start + Duration::hours(1)
}

/// Start for an event created by clicking a day cell.
pub fn day_click_start(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour.min(23)))
}

pub fn default_end(start: NaiveDateTime, minutes: u32) -> NaiveDateTime {
    start + Duration::minutes(i64::from(minutes))
}

/// Wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earlier instant; times skipped by a DST jump are
/// read as UTC.
pub fn to_instant<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// First and last instant of `day` in `tz`, both inclusive.
pub fn day_bounds<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = to_instant(day.and_time(NaiveTime::MIN), tz);
    let next = day.succ_opt().unwrap_or(day);
    let end = to_instant(next.and_time(NaiveTime::MIN), tz) - Duration::milliseconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn t(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_snapping_boundaries() {
        assert_eq!(snap_to_quarter_hour(t(10, 7, 0)), t(10, 0, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 8, 0)), t(10, 15, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 7, 29)), t(10, 0, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 7, 30)), t(10, 0, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 7, 59)), t(10, 0, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 8, 0)), t(10, 15, 0));
        assert_eq!(snap_to_quarter_hour(t(10, 30, 0)), t(10, 30, 0));
    }

    #[test]
    fn test_on_boundary_is_unchanged() {
        assert_eq!(snap_to_quarter_hour(t(10, 45, 20)), t(10, 45, 20));
        assert_eq!(snap_to_quarter_hour(t(10, 52, 40)), t(10, 45, 0));
    }

    #[test]
    fn test_snapping_rolls_over_day() {
        let late = t(23, 53, 0);
        assert_eq!(
            snap_to_quarter_hour(late),
            NaiveDate::from_ymd_opt(2026, 1, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_default_start_is_next_full_hour() {
        assert_eq!(default_start(t(10, 20, 5)), t(11, 0, 0));
        assert_eq!(default_start(t(10, 0, 0)), t(11, 0, 0));
    }

    #[test]
    fn test_day_click_and_end() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let start = day_click_start(day, 9);
        assert_eq!(start, t(9, 0, 0));
        assert_eq!(default_end(start, 60), t(10, 0, 0));
    }

    #[test]
    fn test_day_bounds_in_offset_zone() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let (start, end) = day_bounds(day, &tz);
        assert_eq!(start.to_rfc3339(), "2026-01-04T16:00:00+00:00");
        assert_eq!(end - start, Duration::days(1) - Duration::milliseconds(1));
    }
}
