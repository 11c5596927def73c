//! Application wiring.
//!
//! Picks the hosted or local implementations once from configuration and keeps
//! the calendar acting for whoever the session manager has signed in.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use workdesk_auth::{
    AuthClient, AuthError, ProfileUpdate, SessionCache, SessionManager, SupabaseAuth, UserProfile,
};
use workdesk_calendar::{
    day_click_start, default_end, default_start, to_instant, CalendarError, CalendarEvent,
    CalendarView, DateRange, EventStore, EventSynchronizer, Principal, RemoteEventStore, ViewState,
};
use workdesk_core::Config;
use workdesk_i18n::{Language, SharedLocale, WeekStart};
use workdesk_services::{BackendClient, ObjectStorage};

/// Where sessions and events live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hosted,
    Local,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Hosted => write!(f, "hosted backend"),
            Mode::Local => write!(f, "local-only"),
        }
    }
}

pub struct App {
    config: Arc<Config>,
    mode: Mode,
    locale: SharedLocale,
    sessions: SessionManager,
    calendar: EventSynchronizer,
}

impl App {
    /// Build the application for `config`.
    ///
    /// With a configured backend everything goes to the hosted services.
    /// Without one, accounts live in a local SQLite directory and events in
    /// memory.
    pub fn build(config: Config) -> Result<Self> {
        let locale = SharedLocale::new(Language::default());
        let cache = SessionCache::new(config.session_dir());

        let (mode, sessions, events) = if config.backend.is_configured() {
            let backend = Arc::new(BackendClient::from_config(&config.backend)?);
            let storage = ObjectStorage::new(
                backend.clone(),
                &config.backend.storage_bucket,
                &config.backend.avatars_folder,
            );
            let sessions = SessionManager::new(
                AuthClient::supabase(SupabaseAuth::new(backend.clone())),
                cache,
                locale.clone(),
            )
            .with_storage(storage);
            let events = EventStore::remote(RemoteEventStore::new(backend));
            (Mode::Hosted, sessions, events)
        } else {
            let auth = AuthClient::open_local(&config.local_users_path())?;
            let sessions = SessionManager::new(auth, cache, locale.clone());
            (Mode::Local, sessions, EventStore::local())
        };

        tracing::info!("Workdesk running in {} mode", mode);
        let calendar = EventSynchronizer::new(events, locale.clone());

        Ok(Self {
            config: Arc::new(config),
            mode,
            locale,
            sessions,
            calendar,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn locale(&self) -> &SharedLocale {
        &self.locale
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn calendar(&self) -> &EventSynchronizer {
        &self.calendar
    }

    /// Verify any cached session. Never fails; an invalid session just
    /// leaves the app signed out.
    pub async fn start(&self) -> Option<UserProfile> {
        let profile = self.sessions.verify().await;
        self.sync_principal();
        profile
    }

    fn sync_principal(&self) {
        match (self.sessions.session(), self.sessions.profile()) {
            (Some(session), Some(profile)) => self
                .calendar
                .set_principal(Principal::new(profile.id, Some(session.access_token))),
            _ => self.calendar.clear_principal(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let result = self.sessions.login(email, password).await;
        self.sync_principal();
        result
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        let result = self
            .sessions
            .register(email, password, confirmation, first_name, last_name)
            .await;
        self.sync_principal();
        result
    }

    pub async fn logout(&self) {
        self.sessions.logout().await;
        self.calendar.clear_principal();
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        let result = self.sessions.update_profile(update).await;
        self.sync_principal();
        result
    }

    /// Calendar view state seeded with today and the configured agenda window.
    pub fn view_state(&self, view: CalendarView) -> ViewState {
        ViewState::new(Local::now().date_naive(), view)
            .with_agenda_days(self.config.calendar.agenda_days)
    }

    /// Week start from the signed-in profile, the locale default otherwise.
    pub fn week_start(&self) -> WeekStart {
        self.sessions
            .profile()
            .map(|p| p.week_start())
            .unwrap_or_default()
    }

    /// Load the events `view` shows for the signed-in user.
    pub async fn load_visible(&self, view: &ViewState) -> Result<Vec<CalendarEvent>, CalendarError> {
        let (first, last) = view.visible_range(self.week_start());
        let from = to_instant(first.and_time(chrono::NaiveTime::MIN), &Local);
        let to = to_instant(
            last.succ_opt().unwrap_or(last).and_time(chrono::NaiveTime::MIN),
            &Local,
        ) - chrono::Duration::milliseconds(1);
        self.calendar.load(DateRange::between(from, to)).await
    }

    /// Blank event for the "new event" button, starting at the next full hour.
    pub fn draft_event(&self) -> CalendarEvent {
        let start = default_start(Local::now().naive_local());
        self.draft_from(start)
    }

    /// Blank event for a click on `day`'s cell.
    pub fn draft_event_on(&self, day: NaiveDate) -> CalendarEvent {
        self.draft_from(day_click_start(day, self.config.calendar.default_start_hour))
    }

    fn draft_from(&self, start: chrono::NaiveDateTime) -> CalendarEvent {
        let end = default_end(start, self.config.calendar.default_duration_minutes);
        CalendarEvent::new("", to_instant(start, &Local), to_instant(end, &Local))
    }
}
