//! Calendar view mode, navigation and titles.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use workdesk_i18n::{Locale, WeekStart};

use crate::grid::{days_in_month, first_of_month, start_of_week};

/// Days covered by the agenda view.
pub const AGENDA_DAYS_TO_SHOW: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
    Year,
}

impl CalendarView {
    pub const ALL: [CalendarView; 5] = [
        CalendarView::Month,
        CalendarView::Week,
        CalendarView::Day,
        CalendarView::Agenda,
        CalendarView::Year,
    ];

    /// Translation key for the view's name.
    pub fn label_key(self) -> &'static str {
        match self {
            CalendarView::Month => "calendar.views.month",
            CalendarView::Week => "calendar.views.week",
            CalendarView::Day => "calendar.views.day",
            CalendarView::Agenda => "calendar.views.agenda",
            CalendarView::Year => "calendar.views.year",
        }
    }
}

/// Current date plus view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub current_date: NaiveDate,
    pub view: CalendarView,
    agenda_days: u32,
}

impl ViewState {
    pub fn new(current_date: NaiveDate, view: CalendarView) -> Self {
        Self {
            current_date,
            view,
            agenda_days: AGENDA_DAYS_TO_SHOW,
        }
    }

    /// Override the agenda window (from configuration). Zero is ignored.
    pub fn with_agenda_days(mut self, days: u32) -> Self {
        if days > 0 {
            self.agenda_days = days;
        }
        self
    }

    pub fn agenda_days(&self) -> u32 {
        self.agenda_days
    }

    fn shift(&mut self, forward: bool) {
        let date = self.current_date;
        let shifted = match self.view {
            CalendarView::Month => step_months(date, 1, forward),
            CalendarView::Year => step_months(date, 12, forward),
            CalendarView::Week => step_days(date, 7, forward),
            CalendarView::Day => step_days(date, 1, forward),
            CalendarView::Agenda => step_days(date, i64::from(self.agenda_days), forward),
        };
        self.current_date = shifted.unwrap_or(date);
    }

    pub fn previous(&mut self) {
        self.shift(false);
    }

    pub fn next(&mut self) {
        self.shift(true);
    }

    /// Jump to the local current date.
    pub fn today(&mut self) {
        self.go_to(Local::now().date_naive());
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// Change mode, keeping the date.
    pub fn set_view(&mut self, view: CalendarView) {
        self.view = view;
    }

    /// Inclusive range of dates the active view shows.
    ///
    /// The month view covers whole weeks around the month.
    pub fn visible_range(&self, week_start: WeekStart) -> (NaiveDate, NaiveDate) {
        let date = self.current_date;
        match self.view {
            CalendarView::Month => {
                let first = first_of_month(date);
                let last = first
                    + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1);
                let start = start_of_week(first, week_start);
                let end = start_of_week(last, week_start) + Duration::days(6);
                (start, end)
            }
            CalendarView::Week => {
                let start = start_of_week(date, week_start);
                (start, start + Duration::days(6))
            }
            CalendarView::Day => (date, date),
            CalendarView::Agenda => (
                date,
                date + Duration::days(i64::from(self.agenda_days.saturating_sub(1))),
            ),
            CalendarView::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (start, end)
            }
        }
    }

    /// Header text for the active view.
    pub fn title(&self, locale: &Locale, week_start: WeekStart) -> String {
        let date = self.current_date;
        match self.view {
            CalendarView::Month => locale.format_year_month(date),
            CalendarView::Week | CalendarView::Agenda => {
                let (start, end) = self.visible_range(week_start);
                locale.format_month_span(start, end)
            }
            CalendarView::Day => locale.format_day_title(date),
            CalendarView::Year => locale.format_year(date),
        }
    }
}

fn step_months(date: NaiveDate, months: u32, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_months(Months::new(months))
    } else {
        date.checked_sub_months(Months::new(months))
    }
}

fn step_days(date: NaiveDate, days: i64, forward: bool) -> Option<NaiveDate> {
    let delta = Duration::days(days);
    if forward {
        date.checked_add_signed(delta)
    } else {
        date.checked_sub_signed(delta)
    }
}
