//! Event storage strategies.
//!
//! `EventStore` wraps either an in-memory list (no backend configured) or the
//! hosted table. The strategy is chosen once at startup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::client::RemoteEventStore;
use crate::error::CalendarError;
use crate::types::CalendarEvent;

/// The signed-in user on whose behalf events are read and written.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Principal {
    pub fn new(user_id: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

/// Optional bounds on an event's start, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

#[derive(Debug, Clone)]
struct OwnedEvent {
    owner: String,
    event: CalendarEvent,
}

/// In-memory events keyed by id, scoped by owner.
#[derive(Debug, Default)]
pub struct LocalEventStore {
    events: RwLock<Vec<OwnedEvent>>,
}

impl LocalEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, owner: &str, range: DateRange) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| e.owner == owner && range.contains(e.event.start))
            .map(|e| e.event.clone())
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    pub fn get(&self, owner: &str, id: &str) -> Option<CalendarEvent> {
        self.events
            .read()
            .iter()
            .find(|e| e.owner == owner && e.event.id == id)
            .map(|e| e.event.clone())
    }

    /// Store a copy of `event` under a fresh random id.
    pub fn insert(&self, owner: &str, event: &CalendarEvent) -> CalendarEvent {
        let mut stored = event.clone();
        stored.id = uuid::Uuid::new_v4().to_string();
        self.events.write().push(OwnedEvent {
            owner: owner.to_string(),
            event: stored.clone(),
        });
        stored
    }

    pub fn update(&self, owner: &str, event: &CalendarEvent) -> Result<CalendarEvent, CalendarError> {
        let mut events = self.events.write();
        let slot = events
            .iter_mut()
            .find(|e| e.event.id == event.id)
            .ok_or_else(|| CalendarError::EventNotFound(event.id.clone()))?;
        if slot.owner != owner {
            return Err(CalendarError::Unauthorized(event.id.clone()));
        }
        slot.event = event.clone();
        Ok(event.clone())
    }

    pub fn delete(&self, owner: &str, id: &str) -> Result<(), CalendarError> {
        let mut events = self.events.write();
        let index = events
            .iter()
            .position(|e| e.event.id == id)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        if events[index].owner != owner {
            return Err(CalendarError::Unauthorized(id.to_string()));
        }
        events.remove(index);
        Ok(())
    }
}

/// Event store strategy.
#[derive(Clone)]
pub enum EventStore {
    /// Local-only mode.
    Local(Arc<LocalEventStore>),

    /// Hosted `calendar_events` table.
    Remote(Arc<RemoteEventStore>),
}

impl EventStore {
    pub fn local() -> Self {
        Self::Local(Arc::new(LocalEventStore::new()))
    }

    pub fn remote(store: RemoteEventStore) -> Self {
        Self::Remote(Arc::new(store))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub async fn list(
        &self,
        principal: &Principal,
        range: DateRange,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        match self {
            Self::Local(store) => Ok(store.list(&principal.user_id, range)),
            Self::Remote(store) => store.list(principal, range).await,
        }
    }

    pub async fn get(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<Option<CalendarEvent>, CalendarError> {
        match self {
            Self::Local(store) => Ok(store.get(&principal.user_id, id)),
            Self::Remote(store) => store.get(principal, id).await,
        }
    }

    pub async fn insert(
        &self,
        principal: &Principal,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        match self {
            Self::Local(store) => Ok(store.insert(&principal.user_id, event)),
            Self::Remote(store) => store.insert(principal, event).await,
        }
    }

    pub async fn update(
        &self,
        principal: &Principal,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        match self {
            Self::Local(store) => store.update(&principal.user_id, event),
            Self::Remote(store) => store.update(principal, event).await,
        }
    }

    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<(), CalendarError> {
        match self {
            Self::Local(store) => store.delete(&principal.user_id, id),
            Self::Remote(store) => store.delete(principal, id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(title: &str, hour: u32) -> CalendarEvent {
        CalendarEvent::new(
            title,
            Utc.with_ymd_and_hms(2026, 1, 5, hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 5, hour + 1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_insert_assigns_unique_ids() {
        let store = LocalEventStore::new();
        let a = store.insert("u1", &event("a", 9));
        let b = store.insert("u1", &event("b", 10));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(store.list("u1", DateRange::all()).len(), 2);
    }

    #[test]
    fn test_owner_scoping() {
        let store = LocalEventStore::new();
        let mine = store.insert("u1", &event("mine", 9));
        assert!(store.list("u2", DateRange::all()).is_empty());
        assert!(store.get("u2", &mine.id).is_none());

        let mut changed = mine.clone();
        changed.title = "hijacked".into();
        assert!(matches!(
            store.update("u2", &changed),
            Err(CalendarError::Unauthorized(_))
        ));
        assert!(matches!(
            store.delete("u2", &mine.id),
            Err(CalendarError::Unauthorized(_))
        ));
        assert_eq!(store.get("u1", &mine.id).unwrap().title, "mine");
    }

    #[test]
    fn test_missing_ids() {
        let store = LocalEventStore::new();
        let mut ghost = event("ghost", 9);
        ghost.id = "nope".into();
        assert!(matches!(
            store.update("u1", &ghost),
            Err(CalendarError::EventNotFound(_))
        ));
        assert!(matches!(
            store.delete("u1", "nope"),
            Err(CalendarError::EventNotFound(_))
        ));
    }

    #[test]
    fn test_list_range_and_order() {
        let store = LocalEventStore::new();
        store.insert("u1", &event("late", 15));
        store.insert("u1", &event("early", 8));
        store.insert("u1", &event("noon", 12));

        let all: Vec<String> = store
            .list("u1", DateRange::all())
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(all, vec!["early", "noon", "late"]);

        let range = DateRange::between(
            Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        );
        assert_eq!(store.list("u1", range).len(), 2);
    }
}
