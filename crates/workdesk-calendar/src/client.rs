//! Remote event store backed by the `calendar_events` table.

use std::sync::Arc;

use tracing::instrument;
use workdesk_services::{BackendClient, Method, ServiceError};

use crate::error::CalendarError;
use crate::record::{format_timestamp, EventRecord};
use crate::store::{DateRange, Principal};
use crate::types::CalendarEvent;

const TABLE: &str = "calendar_events";

pub struct RemoteEventStore {
    backend: Arc<BackendClient>,
}

impl RemoteEventStore {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    fn url(&self) -> String {
        self.backend.rest_url(TABLE)
    }

    fn to_events(records: Vec<EventRecord>) -> Result<Vec<CalendarEvent>, CalendarError> {
        records.iter().map(CalendarEvent::from_record).collect()
    }

    /// Events owned by `principal`, optionally limited to a `start_date` range,
    /// ordered by start.
    #[instrument(skip(self, principal), fields(user = %principal.user_id), level = "info")]
    pub async fn list(
        &self,
        principal: &Principal,
        range: DateRange,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", principal.user_id)),
            ("order", "start_date.asc".to_string()),
        ];
        if let Some(from) = range.from {
            query.push(("start_date", format!("gte.{}", format_timestamp(from))));
        }
        if let Some(to) = range.to {
            query.push(("start_date", format!("lte.{}", format_timestamp(to))));
        }

        let response = self
            .backend
            .request(Method::GET, &self.url(), principal.token())
            .query(&query)
            .send()
            .await
            .map_err(ServiceError::from)?;

        let records: Vec<EventRecord> = self.backend.handle_response(response).await?;
        tracing::debug!("Fetched {} events", records.len());
        Self::to_events(records)
    }

    /// Single event by id. Missing rows are `Ok(None)`.
    #[instrument(skip(self, principal), level = "info")]
    pub async fn get(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<Option<CalendarEvent>, CalendarError> {
        let response = self
            .backend
            .request(Method::GET, &self.url(), principal.token())
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", principal.user_id)),
            ])
            .send()
            .await
            .map_err(ServiceError::from)?;

        match self.backend.handle_response::<EventRecord>(response).await {
            Ok(record) => CalendarEvent::from_record(&record).map(Some),
            Err(ServiceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, principal, event), fields(title = %event.title), level = "info")]
    pub async fn insert(
        &self,
        principal: &Principal,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let response = self
            .backend
            .request(Method::POST, &self.url(), principal.token())
            .header("Prefer", "return=representation")
            .json(&event.to_record(&principal.user_id, true))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let records: Vec<EventRecord> = self.backend.handle_response(response).await?;
        let record = records.into_iter().next().ok_or_else(|| {
            CalendarError::InvalidEventData("insert returned no row".to_string())
        })?;
        CalendarEvent::from_record(&record)
    }

    #[instrument(skip(self, principal, event), fields(id = %event.id), level = "info")]
    pub async fn update(
        &self,
        principal: &Principal,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        // The id travels in the filter, not the body.
        let body = event.to_record(&principal.user_id, true);
        let response = self
            .backend
            .request(Method::PATCH, &self.url(), principal.token())
            .header("Prefer", "return=representation")
            .query(&self.owned_row(principal, &event.id))
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::from)?;

        let records: Vec<EventRecord> = self.backend.handle_response(response).await?;
        match records.into_iter().next() {
            Some(record) => CalendarEvent::from_record(&record),
            None => Err(self.classify_missing(principal, &event.id).await),
        }
    }

    #[instrument(skip(self, principal), level = "info")]
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<(), CalendarError> {
        let response = self
            .backend
            .request(Method::DELETE, &self.url(), principal.token())
            .header("Prefer", "return=representation")
            .query(&self.owned_row(principal, id))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let records: Vec<EventRecord> = self.backend.handle_response(response).await?;
        if records.is_empty() {
            return Err(self.classify_missing(principal, id).await);
        }
        Ok(())
    }

    fn owned_row(&self, principal: &Principal, id: &str) -> [(&'static str, String); 2] {
        [
            ("id", format!("eq.{}", id)),
            ("user_id", format!("eq.{}", principal.user_id)),
        ]
    }

    /// A mutation matched no row: the event is gone or belongs to someone else.
    async fn classify_missing(&self, principal: &Principal, id: &str) -> CalendarError {
        let owner_lookup = async {
            let response = self
                .backend
                .request(Method::GET, &self.url(), principal.token())
                .query(&[("select", "id,user_id".to_string()), ("id", format!("eq.{}", id))])
                .send()
                .await?;
            self.backend
                .handle_response::<Vec<serde_json::Value>>(response)
                .await
        };

        match owner_lookup.await {
            Ok(rows) => {
                let owner = rows
                    .first()
                    .and_then(|row| row.get("user_id"))
                    .and_then(|v| v.as_str());
                match owner {
                    Some(owner) if owner != principal.user_id => {
                        tracing::warn!("Rejected change to event {} owned by another user", id);
                        CalendarError::Unauthorized(id.to_string())
                    }
                    _ => CalendarError::EventNotFound(id.to_string()),
                }
            }
            Err(e) => {
                tracing::debug!("Ownership lookup for {} failed: {}", id, e);
                CalendarError::EventNotFound(id.to_string())
            }
        }
    }
}
