//! Persisted shape of a calendar event (`calendar_events` table).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::types::{CalendarEvent, EventColor};

/// Row of the `calendar_events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Omitted on insert so the store generates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub all_day: bool,
    pub location: Option<String>,
    /// Color name
    #[serde(default)]
    pub etiquette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, CalendarError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CalendarError::InvalidEventData(format!("{} '{}': {}", field, value, e)))
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2026-01-05T09:00:00.000Z`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl CalendarEvent {
    /// Map a stored row to the domain shape.
    pub fn from_record(record: &EventRecord) -> Result<Self, CalendarError> {
        let id = record
            .id
            .clone()
            .ok_or_else(|| CalendarError::InvalidEventData("record has no id".to_string()))?;

        Ok(Self {
            id,
            title: record.title.clone(),
            description: non_empty(&record.description),
            start: parse_timestamp("start_date", &record.start_date)?,
            end: parse_timestamp("end_date", &record.end_date)?,
            all_day: record.all_day,
            location: non_empty(&record.location),
            color: record
                .etiquette
                .as_deref()
                .map(EventColor::from_name)
                .unwrap_or_default(),
        })
    }

    /// Map to the stored shape for `owner_id`. `is_new` drops the id.
    pub fn to_record(&self, owner_id: &str, is_new: bool) -> EventRecord {
        EventRecord {
            id: (!is_new && !self.id.is_empty()).then(|| self.id.clone()),
            user_id: owner_id.to_string(),
            title: self.title.clone(),
            description: non_empty(&self.description),
            start_date: format_timestamp(self.start),
            end_date: format_timestamp(self.end),
            all_day: self.all_day,
            location: non_empty(&self.location),
            etiquette: Some(self.color.as_str().to_string()),
            created_at: None,
            updated_at: None,
        }
    }
}
