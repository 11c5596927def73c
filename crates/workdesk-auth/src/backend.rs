//! Auth client over the hosted service or the local user directory.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AuthError;
use crate::local::LocalAuthBackend;
use crate::models::{AuthSession, ProfileUpdate, UserProfile};
use crate::supabase::SupabaseAuth;

/// Chosen once at startup and never switched.
#[derive(Clone)]
pub enum AuthClient {
    /// SQLite user directory (no backend configured).
    Local(Arc<Mutex<LocalAuthBackend>>),

    /// Hosted auth service.
    Supabase(Arc<SupabaseAuth>),
}

/// Run `f` against the local directory on the blocking pool.
async fn blocking<T, F>(store: &Arc<Mutex<LocalAuthBackend>>, f: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce(&LocalAuthBackend) -> Result<T, AuthError> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store.lock()))
        .await
        .map_err(|e| AuthError::Storage(format!("Task join error: {}", e)))?
}

impl AuthClient {
    pub fn local(store: LocalAuthBackend) -> Self {
        Self::Local(Arc::new(Mutex::new(store)))
    }

    /// Open the local directory at `path`, seeding the demo user on first use.
    pub fn open_local(path: &Path) -> Result<Self, AuthError> {
        Ok(Self::local(LocalAuthBackend::new(path)?))
    }

    pub fn supabase(client: SupabaseAuth) -> Self {
        Self::Supabase(Arc::new(client))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Supabase(_))
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthSession, UserProfile), AuthError> {
        match self {
            Self::Local(store) => {
                let email = email.to_string();
                let password = password.to_string();
                blocking(store, move |s| s.sign_in(&email, &password)).await
            }
            Self::Supabase(client) => client.sign_in(email, password).await,
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        match self {
            Self::Local(store) => {
                let email = email.to_string();
                let password = password.to_string();
                let first = first_name.map(str::to_string);
                let last = last_name.map(str::to_string);
                blocking(store, move |s| {
                    s.sign_up(&email, &password, first.as_deref(), last.as_deref())
                })
                .await
            }
            Self::Supabase(client) => {
                client.sign_up(email, password, first_name, last_name).await
            }
        }
    }

    /// Live profile for a session token.
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        match self {
            Self::Local(store) => {
                let token = access_token.to_string();
                blocking(store, move |s| s.user_for_token(&token)).await
            }
            Self::Supabase(client) => client.fetch_user(access_token).await,
        }
    }

    pub async fn update_user(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        match self {
            Self::Local(store) => {
                let token = access_token.to_string();
                let update = update.clone();
                blocking(store, move |s| s.update_user(&token, &update)).await
            }
            Self::Supabase(client) => client.update_user(access_token, user_id, update).await,
        }
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        match self {
            Self::Local(store) => {
                let token = access_token.to_string();
                let password = password.to_string();
                blocking(store, move |s| s.update_password(&token, &password)).await
            }
            Self::Supabase(client) => client.update_password(access_token, password).await,
        }
    }

    /// Locally there is no mail delivery; the request is only logged.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self {
            Self::Local(_) => {
                tracing::info!("Password reset requested for {} (local mode, no email sent)", email);
                Ok(())
            }
            Self::Supabase(client) => client.request_password_reset(email).await,
        }
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        match self {
            Self::Local(_) => {
                tracing::info!("Local accounts are verified on creation; nothing to resend");
                Ok(())
            }
            Self::Supabase(client) => client.resend_verification(email).await,
        }
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        match self {
            Self::Local(store) => {
                let token = access_token.to_string();
                blocking(store, move |s| s.sign_out(&token)).await
            }
            Self::Supabase(client) => client.sign_out(access_token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{DEMO_EMAIL, DEMO_PASSWORD};

    #[tokio::test]
    async fn test_local_round_trip() {
        let client = AuthClient::local(LocalAuthBackend::in_memory().unwrap());
        assert!(!client.is_remote());

        let (session, profile) = client.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        let fetched = client.fetch_user(&session.access_token).await.unwrap();
        assert_eq!(fetched, profile);

        client.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            client.fetch_user(&session.access_token).await,
            Err(AuthError::SessionExpired)
        ));
    }
}
