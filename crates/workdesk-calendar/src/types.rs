//! Calendar event domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use workdesk_core::ValidationError;
use workdesk_i18n::Locale;

/// Event label color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[default]
    Sky,
    Amber,
    Violet,
    Rose,
    Emerald,
    Orange,
}

impl EventColor {
    pub const ALL: [EventColor; 6] = [
        EventColor::Sky,
        EventColor::Amber,
        EventColor::Violet,
        EventColor::Rose,
        EventColor::Emerald,
        EventColor::Orange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventColor::Sky => "sky",
            EventColor::Amber => "amber",
            EventColor::Violet => "violet",
            EventColor::Rose => "rose",
            EventColor::Emerald => "emerald",
            EventColor::Orange => "orange",
        }
    }

    /// Parse a stored color name. Unknown names become the default.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

/// Calendar event as the calendar views see it.
///
/// `id` is empty until the event has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub color: EventColor,
}

impl CalendarEvent {
    /// An unsaved event.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            location: None,
            color: EventColor::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_color(mut self, color: EventColor) -> Self {
        self.color = color;
        self
    }

    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    /// `end` may precede `start` only for all-day events.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.all_day && self.end < self.start {
            return Err(ValidationError::InvalidTimeRange);
        }
        Ok(())
    }

    /// Inclusive overlap test against `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start <= to && self.end >= from
    }

    /// Title for display; blank titles read as the localized "(no title)".
    pub fn display_title(&self, locale: &Locale) -> String {
        if self.title.trim().is_empty() {
            locale.t("eventDialog.noTitle")
        } else {
            self.title.clone()
        }
    }
}
