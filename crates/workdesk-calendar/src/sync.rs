//! Event CRUD synchronizer.
//!
//! Mediates between the calendar views' event list and the selected store.
//! The list only changes after the store confirms; failures leave it untouched
//! and are returned so the caller can revert whatever it showed optimistically.

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use tokio::sync::{broadcast, Mutex};
use workdesk_core::{OpState, OpTracker, Operation, StaleGuard};
use workdesk_i18n::SharedLocale;

use crate::error::CalendarError;
use crate::store::{DateRange, EventStore, Principal};
use crate::types::CalendarEvent;

const NOTIFICATION_CAPACITY: usize = 32;

/// Transient success message for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

pub struct EventSynchronizer {
    store: EventStore,
    locale: SharedLocale,
    principal: RwLock<Option<Principal>>,
    events: RwLock<Vec<CalendarEvent>>,
    busy: OpTracker,
    /// Superseded by each new load.
    loads: StaleGuard,
    /// Invalidated when the signed-in user changes.
    session: StaleGuard,
    /// Serialises loads and mutations so they land in the order issued.
    ops: Mutex<()>,
    notifications: broadcast::Sender<Notification>,
}

impl EventSynchronizer {
    pub fn new(store: EventStore, locale: SharedLocale) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            store,
            locale,
            principal: RwLock::new(None),
            events: RwLock::new(Vec::new()),
            busy: OpTracker::new(),
            loads: StaleGuard::new(),
            session: StaleGuard::new(),
            ops: Mutex::new(()),
            notifications,
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Act on behalf of `principal`. Switching users drops the current list and
    /// any in-flight results.
    pub fn set_principal(&self, principal: Principal) {
        let mut current = self.principal.write();
        let switched = current
            .as_ref()
            .map_or(true, |p| p.user_id != principal.user_id);
        if switched {
            tracing::info!("Calendar now acting for user {}", principal.user_id);
            self.reset();
        }
        *current = Some(principal);
    }

    pub fn clear_principal(&self) {
        if self.principal.write().take().is_some() {
            tracing::info!("Calendar principal cleared");
        }
        self.reset();
    }

    fn reset(&self) {
        self.session.invalidate();
        self.loads.invalidate();
        self.events.write().clear();
    }

    pub fn principal(&self) -> Option<Principal> {
        self.principal.read().clone()
    }

    fn require_principal(&self) -> Result<Principal, CalendarError> {
        self.principal
            .read()
            .clone()
            .ok_or(CalendarError::Unauthenticated)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Snapshot of the loaded events.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.read().clone()
    }

    pub fn op_state(&self) -> OpState {
        self.busy.state()
    }

    /// True while any load or mutation is in flight or queued.
    pub fn is_loading(&self) -> bool {
        self.busy.is_loading()
    }

    fn notify(&self, key: &str, event: &CalendarEvent) {
        let locale = self.locale.get();
        let title = event.display_title(&locale);
        let day: NaiveDate = event.start.with_timezone(&Local).date_naive();
        let notification = Notification {
            title: locale.t_with(key, &[("title", title.as_str())]),
            description: locale.format_event_date(day),
        };
        // No receivers is fine.
        let _ = self.notifications.send(notification);
    }

    /// Replace the list with the principal's events in `range`.
    ///
    /// A load overtaken by a newer load or a user switch returns its events but
    /// does not touch the list.
    pub async fn load(&self, range: DateRange) -> Result<Vec<CalendarEvent>, CalendarError> {
        let principal = self.require_principal()?;
        let ticket = self.loads.begin();
        let _busy = self.busy.begin(Operation::LoadEvents);
        // Mutations confirmed before this point are in the snapshot; later
        // ones wait until the list is replaced.
        let _order = self.ops.lock().await;

        let events = self
            .store
            .list(&principal, range)
            .await
            .inspect_err(|e| tracing::error!("Failed to load events: {}", e))?;
        if self.loads.is_current(ticket) {
            *self.events.write() = events.clone();
        } else {
            tracing::debug!("Discarding stale event load");
        }
        Ok(events)
    }

    /// Look up one event. Absent events are `Ok(None)`.
    pub async fn get(&self, id: &str) -> Result<Option<CalendarEvent>, CalendarError> {
        let principal = self.require_principal()?;
        self.store.get(&principal, id).await
    }

    pub async fn add(&self, event: CalendarEvent) -> Result<CalendarEvent, CalendarError> {
        event.validate()?;
        let principal = self.require_principal()?;
        let _busy = self.busy.begin(Operation::SaveEvent);
        let _order = self.ops.lock().await;
        let session = self.session.current();

        let result = self.store.insert(&principal, &event).await;

        let saved = result.inspect_err(|e| tracing::error!("Failed to create event: {}", e))?;
        if self.session.is_current(session) {
            self.events.write().push(saved.clone());
            self.notify("calendar.eventAdded", &saved);
        }
        Ok(saved)
    }

    pub async fn update(&self, event: CalendarEvent) -> Result<CalendarEvent, CalendarError> {
        self.save_existing(event, "calendar.eventUpdated").await
    }

    /// Update after a drag or resize.
    pub async fn move_event(&self, event: CalendarEvent) -> Result<CalendarEvent, CalendarError> {
        self.save_existing(event, "calendar.eventMoved").await
    }

    async fn save_existing(
        &self,
        event: CalendarEvent,
        notice: &str,
    ) -> Result<CalendarEvent, CalendarError> {
        event.validate()?;
        if event.is_new() {
            return Err(CalendarError::InvalidEventData(
                "event has no id".to_string(),
            ));
        }
        let principal = self.require_principal()?;
        let _busy = self.busy.begin(Operation::SaveEvent);
        let _order = self.ops.lock().await;
        let session = self.session.current();

        let result = self.store.update(&principal, &event).await;

        let saved = result.inspect_err(|e| tracing::error!("Failed to update event: {}", e))?;
        if self.session.is_current(session) {
            if let Some(slot) = self.events.write().iter_mut().find(|e| e.id == saved.id) {
                *slot = saved.clone();
            }
            self.notify(notice, &saved);
        }
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CalendarError> {
        let principal = self.require_principal()?;
        let _busy = self.busy.begin(Operation::DeleteEvent);
        let _order = self.ops.lock().await;
        let session = self.session.current();

        let result = self.store.delete(&principal, id).await;

        result.inspect_err(|e| tracing::error!("Failed to delete event {}: {}", id, e))?;
        if self.session.is_current(session) {
            let removed = {
                let mut events = self.events.write();
                let index = events.iter().position(|e| e.id == id);
                index.map(|i| events.remove(i))
            };
            if let Some(event) = removed {
                self.notify("calendar.eventDeleted", &event);
            }
        }
        Ok(())
    }
}
