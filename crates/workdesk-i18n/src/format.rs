//! Locale-aware date formatting for calendar titles and notifications.

use chrono::{Datelike, NaiveDate};

use crate::language::DatePattern;
use crate::locale::Locale;
use crate::names::{month_name, weekday_full, weekday_short};

impl Locale {
    fn pattern(&self) -> DatePattern {
        self.language().date_pattern()
    }

    /// "January 2026" / "2026年1月"
    pub fn format_year_month(&self, date: NaiveDate) -> String {
        match self.pattern() {
            DatePattern::Latin => {
                format!("{} {}", month_name(self.language(), date.month()), date.year())
            }
            DatePattern::Cjk => format!("{}年{}月", date.year(), date.month()),
        }
    }

    /// "Jan" / "1月"
    pub fn format_month_short(&self, date: NaiveDate) -> String {
        match self.pattern() {
            DatePattern::Latin => month_name(self.language(), date.month())
                .chars()
                .take(3)
                .collect(),
            DatePattern::Cjk => format!("{}月", date.month()),
        }
    }

    /// Year view heading: "2026" / "2026年"
    pub fn format_year(&self, date: NaiveDate) -> String {
        match self.pattern() {
            DatePattern::Latin => date.year().to_string(),
            DatePattern::Cjk => format!("{}年", date.year()),
        }
    }

    /// Day view heading: "Mon January 5, 2026" / "2026年1月5日 星期一"
    pub fn format_day_title(&self, date: NaiveDate) -> String {
        let lang = self.language();
        match self.pattern() {
            DatePattern::Latin => format!(
                "{} {} {}, {}",
                weekday_short(lang, date.weekday()),
                month_name(lang, date.month()),
                date.day(),
                date.year()
            ),
            DatePattern::Cjk => format!(
                "{}年{}月{}日 {}",
                date.year(),
                date.month(),
                date.day(),
                weekday_full(lang, date.weekday())
            ),
        }
    }

    /// Notification description: "Jan 5, 2026" / "2026年1月5日"
    pub fn format_event_date(&self, date: NaiveDate) -> String {
        match self.pattern() {
            DatePattern::Latin => format!(
                "{} {}, {}",
                self.format_month_short(date),
                date.day(),
                date.year()
            ),
            DatePattern::Cjk => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
        }
    }

    /// Title for a span of days: a single month reads like `format_year_month`,
    /// otherwise "Dec - January 2026" / "12月 - 2026年1月".
    pub fn format_month_span(&self, start: NaiveDate, end: NaiveDate) -> String {
        if start.year() == end.year() && start.month() == end.month() {
            self.format_year_month(start)
        } else {
            format!(
                "{} - {}",
                self.format_month_short(start),
                self.format_year_month(end)
            )
        }
    }
}
