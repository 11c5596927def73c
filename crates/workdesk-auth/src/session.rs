//! Auth/profile session manager.
//!
//! Owns the current [`AuthSession`] and [`UserProfile`]. Dependents read the
//! profile through [`SessionManager::subscribe`] and the shared locale, which is
//! re-resolved whenever the profile's language changes.

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::instrument;
use workdesk_core::{OpState, OpTracker, Operation, StaleGuard, ValidationError};
use workdesk_i18n::SharedLocale;
use workdesk_services::{inline_data_url, validate_image, ObjectStorage, UploadFile};

use crate::backend::AuthClient;
use crate::error::AuthError;
use crate::models::{AuthSession, ProfileUpdate, UserProfile};
use crate::storage::SessionCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
}

pub struct SessionManager {
    client: AuthClient,
    cache: SessionCache,
    storage: Option<ObjectStorage>,
    locale: SharedLocale,
    state: RwLock<SessionState>,
    session: RwLock<Option<AuthSession>>,
    profile: watch::Sender<Option<UserProfile>>,
    busy: OpTracker,
    /// Invalidated on logout so in-flight completions do not resurrect a session.
    generation: StaleGuard,
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn require_matching(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    require_non_empty(password, "password")?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

impl SessionManager {
    pub fn new(client: AuthClient, cache: SessionCache, locale: SharedLocale) -> Self {
        let (profile, _) = watch::channel(None);
        Self {
            client,
            cache,
            storage: None,
            locale,
            state: RwLock::new(SessionState::Anonymous),
            session: RwLock::new(None),
            profile,
            busy: OpTracker::new(),
            generation: StaleGuard::new(),
        }
    }

    /// Upload avatars to the hosted object store instead of inlining them.
    pub fn with_storage(mut self, storage: ObjectStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    pub fn locale(&self) -> &SharedLocale {
        &self.locale
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.borrow().clone()
    }

    pub fn is_admin(&self) -> bool {
        matches!(&*self.profile.borrow(), Some(p) if p.is_admin)
    }

    /// Receiver that observes every profile change, `None` when signed out.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.profile.subscribe()
    }

    pub fn op_state(&self) -> OpState {
        self.busy.state()
    }

    pub fn is_loading(&self) -> bool {
        self.busy.is_loading()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    fn access_token(&self) -> Result<String, AuthError> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(AuthError::NotSignedIn)
    }

    fn signed_in(&self) -> Result<(String, UserProfile), AuthError> {
        let token = self.access_token()?;
        let profile = self.profile().ok_or(AuthError::NotSignedIn)?;
        Ok((token, profile))
    }

    /// Publish `profile` and re-resolve the locale from it.
    fn set_profile(&self, profile: UserProfile) {
        self.locale.set_language(profile.language);
        if let Err(e) = self.cache.save_profile(&profile) {
            tracing::warn!("Failed to cache profile: {:#}", e);
        }
        self.profile.send_replace(Some(profile));
    }

    fn establish(&self, session: AuthSession, profile: UserProfile) {
        if let Err(e) = self.cache.save_session(&session) {
            tracing::warn!("Failed to cache session: {:#}", e);
        }
        *self.session.write() = Some(session);
        self.set_profile(profile);
        self.set_state(SessionState::Authenticated);
    }

    /// Drop every trace of the session locally.
    fn clear_local(&self) {
        self.generation.invalidate();
        *self.session.write() = None;
        if let Err(e) = self.cache.clear() {
            tracing::warn!("Failed to clear session cache: {:#}", e);
        }
        self.profile.send_replace(None);
        self.set_state(SessionState::Anonymous);
    }

    /// Sign in. On failure the manager stays anonymous and the backend's
    /// message is returned untouched.
    #[instrument(skip(self, password), level = "info")]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        require_non_empty(email, "email")?;
        require_non_empty(password, "password")?;

        let _busy = self.busy.begin(Operation::SignIn);
        self.login_inner(email, password).await
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        self.set_state(SessionState::Authenticating);
        let ticket = self.generation.begin();

        match self.client.sign_in(email, password).await {
            Ok((session, profile)) => {
                if !self.generation.is_current(ticket) {
                    tracing::info!("Sign-in completed after it was superseded; discarding");
                    if let Err(e) = self.client.sign_out(&session.access_token).await {
                        tracing::warn!("Failed to revoke superseded session: {}", e);
                    }
                    return Err(AuthError::NotSignedIn);
                }
                tracing::info!("Signed in as {}", profile.id);
                self.establish(session, profile.clone());
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                if self.generation.is_current(ticket) {
                    self.set_state(SessionState::Anonymous);
                }
                Err(e)
            }
        }
    }

    /// Create an account and sign in with it.
    ///
    /// A mismatched confirmation fails before anything is sent.
    #[instrument(skip(self, password, confirmation), level = "info")]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirmation: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        require_non_empty(email, "email")?;
        require_matching(password, confirmation)?;

        self.set_state(SessionState::Authenticating);
        let created = {
            let _busy = self.busy.begin(Operation::Register);
            self.client
                .sign_up(email, password, first_name, last_name)
                .await
        };

        if let Err(e) = created {
            tracing::warn!("Registration failed: {}", e);
            self.set_state(SessionState::Anonymous);
            return Err(e);
        }
        self.login(email, password).await
    }

    /// Send only the provided fields and merge the stored result.
    #[instrument(skip(self, update), level = "info")]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        let (token, current) = self.signed_in()?;
        if update.is_empty() {
            return Ok(current);
        }

        let ticket = self.generation.current();
        let result = {
            let _busy = self.busy.begin(Operation::UpdateProfile);
            self.client.update_user(&token, &current.id, &update).await
        };

        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                if e.invalidates_session() && self.generation.is_current(ticket) {
                    tracing::info!("Session rejected during profile update; signing out locally");
                    self.clear_local();
                }
                return Err(e);
            }
        };

        if self.generation.is_current(ticket) {
            self.set_profile(profile.clone());
        } else {
            tracing::debug!("Profile update finished after sign-out; not applied");
        }
        Ok(profile)
    }

    /// Current profile. With `force_refresh` the cache is bypassed and the
    /// profile is re-read from the live session, overwriting the cache.
    pub async fn get_user(&self, force_refresh: bool) -> Result<Option<UserProfile>, AuthError> {
        if !force_refresh {
            if let Some(profile) = self.profile() {
                return Ok(Some(profile));
            }
            if self.session.read().is_none() {
                return Ok(None);
            }
            match self.cache.load_profile() {
                Ok(Some(profile)) => {
                    self.profile.send_replace(Some(profile.clone()));
                    return Ok(Some(profile));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to read cached profile: {:#}", e),
            }
        }

        let token = match self.access_token() {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let ticket = self.generation.current();
        match self.client.fetch_user(&token).await {
            Ok(profile) => {
                if self.generation.is_current(ticket) {
                    self.set_profile(profile.clone());
                }
                Ok(Some(profile))
            }
            Err(e) => {
                if e.invalidates_session() && self.generation.is_current(ticket) {
                    self.clear_local();
                }
                Err(e)
            }
        }
    }

    /// Sign out. Safe to call when already signed out.
    #[instrument(skip(self), level = "info")]
    pub async fn logout(&self) {
        let session = self.session.read().clone();
        self.clear_local();

        if let Some(session) = session {
            if let Err(e) = self.client.sign_out(&session.access_token).await {
                tracing::warn!("Backend sign-out failed: {}", e);
            }
            tracing::info!("Signed out");
        }
    }

    /// Validate the cached session once at startup.
    ///
    /// A rejected or expired token clears the session without an error. When
    /// the backend cannot be reached the cached profile is kept.
    #[instrument(skip(self), level = "info")]
    pub async fn verify(&self) -> Option<UserProfile> {
        let session = match self.cache.load_session() {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read cached session: {:#}", e);
                return None;
            }
        };

        if session.is_expired() {
            tracing::info!("Cached session expired; clearing");
            self.clear_local();
            return None;
        }

        let ticket = self.generation.current();
        match self.client.fetch_user(&session.access_token).await {
            Ok(profile) if self.generation.is_current(ticket) => {
                tracing::info!("Restored session for {}", profile.id);
                self.establish(session, profile.clone());
                Some(profile)
            }
            Ok(_) => None,
            Err(e) if e.invalidates_session() => {
                tracing::info!("Cached session no longer valid; clearing");
                self.clear_local();
                None
            }
            Err(e) => {
                tracing::warn!("Could not verify session: {}", e);
                let cached = self.cache.load_profile().ok().flatten()?;
                *self.session.write() = Some(session);
                self.profile.send_replace(Some(cached.clone()));
                self.locale.set_language(cached.language);
                self.set_state(SessionState::Authenticated);
                Some(cached)
            }
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        require_non_empty(email, "email")?;
        self.client.request_password_reset(email).await
    }

    /// Set a new password for the signed-in user.
    #[instrument(skip(self, password, confirmation), level = "info")]
    pub async fn reset_password(&self, password: &str, confirmation: &str) -> Result<(), AuthError> {
        require_matching(password, confirmation)?;
        let token = self.access_token()?;
        self.client.update_password(&token, password).await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        require_non_empty(email, "email")?;
        self.client.resend_verification(email).await
    }

    /// Replace the profile picture.
    ///
    /// Uploads to the object store when one is configured and stores an inline
    /// data URL otherwise.
    #[instrument(skip(self, file), level = "info")]
    pub async fn change_avatar(&self, file: UploadFile) -> Result<UserProfile, AuthError> {
        validate_image(&file.content_type, file.bytes.len())?;
        let (token, profile) = self.signed_in()?;

        let url = match &self.storage {
            Some(storage) => {
                let _busy = self.busy.begin(Operation::Upload);
                storage
                    .upload_avatar(&profile.id, file, Some(&token))
                    .await?
                    .url
            }
            None => inline_data_url(&file.content_type, &file.bytes),
        };

        self.update_profile(ProfileUpdate::pic(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{LocalAuthBackend, DEMO_EMAIL, DEMO_PASSWORD};
    use workdesk_i18n::Language;

    fn manager(dir: &std::path::Path) -> SessionManager {
        SessionManager::new(
            AuthClient::local(LocalAuthBackend::in_memory().unwrap()),
            SessionCache::new(dir),
            SharedLocale::new(Language::En),
        )
    }

    #[tokio::test]
    async fn test_demo_login_is_admin() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());

        let profile = sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        assert!(profile.is_admin);
        assert!(sessions.is_admin());
        assert_eq!(sessions.state(), SessionState::Authenticated);
        assert!(sessions.session().is_some());
        assert!(!sessions.is_loading());
    }

    #[tokio::test]
    async fn test_failed_login_stays_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());

        let err = sessions.login(DEMO_EMAIL, "wrong").await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid email or password");
        assert_eq!(sessions.state(), SessionState::Anonymous);
        assert!(sessions.profile().is_none());
    }

    #[tokio::test]
    async fn test_language_change_re_resolves_locale() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());
        sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(sessions.locale().t("common.save"), "Save");

        sessions
            .update_profile(ProfileUpdate::language(Language::Zh))
            .await
            .unwrap();

        assert_eq!(sessions.locale().t("common.save"), "保存");
        assert_eq!(sessions.profile().unwrap().language, Language::Zh);
    }

    #[tokio::test]
    async fn test_register_mismatch_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());

        let err = sessions
            .register("new@kt.com", "abc123", "abc124", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(ValidationError::PasswordMismatch)));
        assert_eq!(sessions.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());

        let profile = sessions
            .register("new@kt.com", "abc123", "abc123", Some("New"), Some("User"))
            .await
            .unwrap();

        assert_eq!(profile.email, "new@kt.com");
        assert_eq!(sessions.state(), SessionState::Authenticated);
        assert!(!sessions.is_admin());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());
        let mut profiles = sessions.subscribe();

        sessions.logout().await;
        sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert!(profiles.borrow_and_update().is_some());

        sessions.logout().await;
        sessions.logout().await;

        assert_eq!(sessions.state(), SessionState::Anonymous);
        assert!(sessions.session().is_none());
        assert!(profiles.borrow_and_update().is_none());
        assert!(SessionCache::new(dir.path()).load_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_user_force_refresh_overwrites_cache() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());
        sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let mut stale = sessions.profile().unwrap();
        stale.first_name = "Stale".into();
        SessionCache::new(dir.path()).save_profile(&stale).unwrap();
        sessions.profile.send_replace(Some(stale));

        let cached = sessions.get_user(false).await.unwrap().unwrap();
        assert_eq!(cached.first_name, "Stale");

        let fresh = sessions.get_user(true).await.unwrap().unwrap();
        assert_eq!(fresh.first_name, "Demo");
        let on_disk = SessionCache::new(dir.path()).load_profile().unwrap().unwrap();
        assert_eq!(on_disk.first_name, "Demo");
    }

    #[tokio::test]
    async fn test_verify_clears_unknown_token_silently() {
        let dir = tempfile::tempdir().unwrap();
        SessionCache::new(dir.path())
            .save_session(&AuthSession::new("not-a-token"))
            .unwrap();
        let sessions = manager(dir.path());

        assert!(sessions.verify().await.is_none());
        assert_eq!(sessions.state(), SessionState::Anonymous);
        assert!(SessionCache::new(dir.path()).load_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_password_requires_match_then_session() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());

        assert!(matches!(
            sessions.reset_password("a", "b").await,
            Err(AuthError::Validation(ValidationError::PasswordMismatch))
        ));
        assert!(matches!(
            sessions.reset_password("a", "a").await,
            Err(AuthError::NotSignedIn)
        ));

        sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        sessions.reset_password("fresh1", "fresh1").await.unwrap();
        sessions.logout().await;
        assert!(sessions.login(DEMO_EMAIL, "fresh1").await.is_ok());
    }

    #[tokio::test]
    async fn test_local_avatar_is_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = manager(dir.path());
        sessions.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let file = UploadFile {
            file_name: "me.png".into(),
            content_type: "image/png".into(),
            bytes: b"hi".to_vec(),
        };
        let profile = sessions.change_avatar(file).await.unwrap();
        assert_eq!(profile.pic.as_deref(), Some("data:image/png;base64,aGk="));

        let not_image = UploadFile {
            file_name: "cv.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![1],
        };
        assert!(matches!(
            sessions.change_avatar(not_image).await,
            Err(AuthError::Validation(ValidationError::InvalidFileType(_)))
        ));
    }
}
