//! Month/year grids, week rows and per-day event bucketing.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, TimeZone};
use workdesk_i18n::WeekStart;

use crate::timing::day_bounds;
use crate::types::CalendarEvent;

/// One month laid out in week rows: leading blanks, then one cell per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<Option<NaiveDate>>,
}

impl MonthGrid {
    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Cells split into rows of seven. The last row may be short.
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<NaiveDate>]> {
        self.cells.chunks(7)
    }

    /// Events overlapping each day of the month, keyed by day.
    pub fn bucket<'a, Tz: TimeZone>(
        &self,
        events: &'a [CalendarEvent],
        tz: &Tz,
    ) -> BTreeMap<NaiveDate, Vec<&'a CalendarEvent>> {
        self.days()
            .map(|day| (day, events_for_day(events, day, tz)))
            .collect()
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|n| (n - first).num_days() as u32).unwrap_or(31)
}

/// Grid for `month` of `year`. `None` for an invalid month.
pub fn month_grid(year: i32, month: u32, week_start: WeekStart) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let blanks = week_start.offset(first.weekday()) as usize;

    let mut cells: Vec<Option<NaiveDate>> = vec![None; blanks];
    cells.extend(first.iter_days().take(days_in_month(year, month) as usize).map(Some));

    Some(MonthGrid { year, month, cells })
}

/// Twelve month grids for the year view.
pub fn year_grid(year: i32, week_start: WeekStart) -> Vec<MonthGrid> {
    (1..=12)
        .filter_map(|month| month_grid(year, month, week_start))
        .collect()
}

pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    date - Duration::days(i64::from(week_start.offset(date.weekday())))
}

/// The seven days of the week containing `date`.
pub fn week_days(date: NaiveDate, week_start: WeekStart) -> [NaiveDate; 7] {
    let start = start_of_week(date, week_start);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Events overlapping `day` (inclusive at both ends), ordered by start.
pub fn events_for_day<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a CalendarEvent> {
    let (from, to) = day_bounds(day, tz);
    let mut matched: Vec<&CalendarEvent> = events.iter().filter(|e| e.overlaps(from, to)).collect();
    matched.sort_by_key(|e| e.start);
    matched
}

/// A day in the agenda list.
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaDay<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a CalendarEvent>,
}

/// Days from `start` for `days` days that have at least one event.
pub fn agenda<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    start: NaiveDate,
    days: u32,
    tz: &Tz,
) -> Vec<AgendaDay<'a>> {
    start
        .iter_days()
        .take(days as usize)
        .filter_map(|date| {
            let events = events_for_day(events, date, tz);
            (!events.is_empty()).then_some(AgendaDay { date, events })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(
            title,
            start.parse().unwrap(),
            end.parse().unwrap(),
        )
    }

    #[test]
    fn test_month_grid_leading_blanks_match_first_weekday() {
        for year in [2024, 2025, 2026] {
            for month in 1..=12 {
                let grid = month_grid(year, month, WeekStart::Sunday).unwrap();
                let first = date(year, month, 1);
                assert_eq!(
                    grid.leading_blanks() as u32,
                    first.weekday().num_days_from_sunday()
                );
                assert_eq!(grid.days().count() as u32, days_in_month(year, month));
            }
        }
    }

    #[test]
    fn test_monday_start_shifts_blanks() {
        // 1 Feb 2026 is a Sunday.
        assert_eq!(date(2026, 2, 1).weekday(), Weekday::Sun);
        assert_eq!(month_grid(2026, 2, WeekStart::Sunday).unwrap().leading_blanks(), 0);
        assert_eq!(month_grid(2026, 2, WeekStart::Monday).unwrap().leading_blanks(), 6);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 13), 0);
        assert!(month_grid(2026, 0, WeekStart::Sunday).is_none());
    }

    #[test]
    fn test_year_grid() {
        let grids = year_grid(2026, WeekStart::Sunday);
        assert_eq!(grids.len(), 12);
        assert_eq!(grids.iter().map(|g| g.days().count()).sum::<usize>(), 365);
    }

    #[test]
    fn test_week_days() {
        let days = week_days(date(2026, 1, 7), WeekStart::Monday);
        assert_eq!(days[0], date(2026, 1, 5));
        assert_eq!(days[6], date(2026, 1, 11));
        assert_eq!(week_days(date(2026, 1, 7), WeekStart::Sunday)[0], date(2026, 1, 4));
    }

    #[test]
    fn test_events_for_day_inclusive_and_sorted() {
        let events = vec![
            event("late", "2026-01-05T15:00:00Z", "2026-01-05T16:00:00Z"),
            event("early", "2026-01-05T08:00:00Z", "2026-01-05T09:00:00Z"),
            event("multi", "2026-01-03T10:00:00Z", "2026-01-06T10:00:00Z"),
            event("touches midnight", "2026-01-04T22:00:00Z", "2026-01-05T00:00:00Z"),
            event("other day", "2026-01-07T08:00:00Z", "2026-01-07T09:00:00Z"),
        ];
        let titles: Vec<&str> = events_for_day(&events, date(2026, 1, 5), &Utc)
            .into_iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["multi", "touches midnight", "early", "late"]);
    }

    #[test]
    fn test_bucket_and_agenda() {
        let events = vec![
            event("a", "2026-01-05T08:00:00Z", "2026-01-05T09:00:00Z"),
            event("b", "2026-01-20T08:00:00Z", "2026-01-20T09:00:00Z"),
        ];
        let grid = month_grid(2026, 1, WeekStart::Sunday).unwrap();
        let buckets = grid.bucket(&events, &Utc);
        assert_eq!(buckets.len(), 31);
        assert_eq!(buckets[&date(2026, 1, 5)].len(), 1);
        assert!(buckets[&date(2026, 1, 6)].is_empty());

        let list = agenda(&events, date(2026, 1, 1), 10, &Utc);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].date, date(2026, 1, 5));
    }
}
