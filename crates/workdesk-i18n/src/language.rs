//! Supported languages and calendar week conventions.

use serde::{Deserialize, Serialize};

/// Interface language of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    De,
    Es,
    Fr,
    Ja,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Zh,
        Language::De,
        Language::Es,
        Language::Fr,
        Language::Ja,
    ];

    /// Resolve a language code. Unknown or missing codes fall back to English.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
            Some("zh") => Language::Zh,
            Some("de") => Language::De,
            Some("es") => Language::Es,
            Some("fr") => Language::Fr,
            Some("ja") => Language::Ja,
            _ => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::De => "de",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Ja => "ja",
        }
    }

    /// Date-pattern family used when formatting titles.
    pub fn date_pattern(self) -> DatePattern {
        match self {
            Language::Zh | Language::Ja => DatePattern::Cjk,
            _ => DatePattern::Latin,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Token ordering for formatted dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// "January 2026", "Mon January 5, 2026"
    Latin,
    /// "2026年1月", "2026年1月5日 星期一"
    Cjk,
}

/// First column of week-based grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> chrono::Weekday {
        match self {
            WeekStart::Sunday => chrono::Weekday::Sun,
            WeekStart::Monday => chrono::Weekday::Mon,
        }
    }

    /// Column index of `day` in a week starting on `self`.
    pub fn offset(self, day: chrono::Weekday) -> u32 {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday(),
            WeekStart::Monday => day.num_days_from_monday(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn unknown_codes_fall_back_to_english() {
        assert_eq!(Language::from_code(Some("zh")), Language::Zh);
        assert_eq!(Language::from_code(Some("JA")), Language::Ja);
        assert_eq!(Language::from_code(Some("pt")), Language::En);
        assert_eq!(Language::from_code(None), Language::En);
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Language::Zh).unwrap();
        assert_eq!(json, "\"zh\"");
        let week: WeekStart = serde_json::from_str("\"monday\"").unwrap();
        assert_eq!(week, WeekStart::Monday);
    }

    #[test]
    fn week_offsets() {
        assert_eq!(WeekStart::Sunday.offset(Weekday::Sun), 0);
        assert_eq!(WeekStart::Monday.offset(Weekday::Sun), 6);
        assert_eq!(WeekStart::Monday.offset(Weekday::Mon), 0);
    }
}
