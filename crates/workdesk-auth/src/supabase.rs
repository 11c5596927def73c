//! Hosted auth service adapter.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;
use workdesk_services::{BackendClient, Method, ServiceError};

use crate::error::AuthError;
use crate::models::{AuthSession, ProfileUpdate, UserProfile};

/// User object returned by the auth service.
#[derive(Debug, Clone, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl AuthUser {
    fn into_profile(self) -> UserProfile {
        UserProfile::from_auth_user(
            &self.id,
            self.email.as_deref().unwrap_or_default(),
            &self.user_metadata,
            self.email_confirmed_at.is_some(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

/// Sign-up answers with a bare user, or with a session when confirmation is off.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: AuthUser },
    User(AuthUser),
}

fn credentials_error(err: ServiceError) -> AuthError {
    match err {
        ServiceError::Unauthorized(message)
        | ServiceError::Api {
            status: 400,
            message,
        } => AuthError::InvalidCredentials(message),
        other => other.into(),
    }
}

fn signup_error(err: ServiceError) -> AuthError {
    match err {
        ServiceError::Api { status, message }
            if (status == 400 || status == 422) && message.contains("already registered") =>
        {
            AuthError::UserExists(message)
        }
        other => other.into(),
    }
}

/// Client for the hosted auth endpoints (`/auth/v1`).
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    backend: Arc<BackendClient>,
}

impl SupabaseAuth {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    /// Password grant. Backend rejections surface with their message intact.
    #[instrument(skip(self, password), level = "info")]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthSession, UserProfile), AuthError> {
        let url = self.backend.auth_url("token?grant_type=password");
        let response = self
            .backend
            .request(Method::POST, &url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let token: TokenResponse = self
            .backend
            .handle_response(response)
            .await
            .map_err(credentials_error)?;

        let expires_at = token.expires_at.or_else(|| {
            token
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        let session = AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
        };
        Ok((session, token.user.into_profile()))
    }

    /// Create an account. Names and the derived username go into user metadata.
    #[instrument(skip(self, password), level = "info")]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserProfile, AuthError> {
        let mut data = serde_json::Map::new();
        data.insert(
            "username".into(),
            json!(email.split('@').next().unwrap_or_default()),
        );
        if let Some(first) = first_name.filter(|s| !s.trim().is_empty()) {
            data.insert("first_name".into(), json!(first.trim()));
        }
        if let Some(last) = last_name.filter(|s| !s.trim().is_empty()) {
            data.insert("last_name".into(), json!(last.trim()));
        }
        if let (Some(first), Some(last)) = (data.get("first_name"), data.get("last_name")) {
            let fullname = format!(
                "{} {}",
                first.as_str().unwrap_or_default(),
                last.as_str().unwrap_or_default()
            );
            data.insert("fullname".into(), json!(fullname));
        }

        let url = self.backend.auth_url("signup");
        let response = self
            .backend
            .request(Method::POST, &url, None)
            .json(&json!({ "email": email, "password": password, "data": data }))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let created: SignUpResponse = self
            .backend
            .handle_response(response)
            .await
            .map_err(signup_error)?;
        let user = match created {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        };
        tracing::info!("Registered user {}", user.id);
        Ok(user.into_profile())
    }

    /// The user behind `access_token`, read live from the service.
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let url = self.backend.auth_url("user");
        let response = self
            .backend
            .request(Method::GET, &url, Some(access_token))
            .send()
            .await
            .map_err(ServiceError::from)?;

        let user: AuthUser = self.backend.handle_response(response).await?;
        Ok(user.into_profile())
    }

    /// Write profile fields into user metadata.
    ///
    /// Uses the admin endpoint when a service role key is configured so that
    /// privileged fields such as `is_admin` can be set.
    #[instrument(skip(self, access_token, update), level = "info")]
    pub async fn update_user(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        let metadata = update.to_metadata();

        let admin_url = self.backend.auth_url(&format!("admin/users/{}", user_id));
        let request = match self.backend.privileged_request(Method::PUT, &admin_url) {
            Some(request) => {
                let mut body = json!({ "user_metadata": metadata });
                if let Some(email) = &update.email {
                    body["email"] = json!(email);
                }
                request.json(&body)
            }
            None => {
                let mut body = json!({ "data": metadata });
                if let Some(email) = &update.email {
                    body["email"] = json!(email);
                }
                let url = self.backend.auth_url("user");
                self.backend
                    .request(Method::PUT, &url, Some(access_token))
                    .json(&body)
            }
        };

        let response = request.send().await.map_err(ServiceError::from)?;
        let user: AuthUser = self.backend.handle_response(response).await?;
        Ok(user.into_profile())
    }

    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let url = self.backend.auth_url("user");
        let response = self
            .backend
            .request(Method::PUT, &url, Some(access_token))
            .json(&json!({ "password": password }))
            .send()
            .await
            .map_err(ServiceError::from)?;

        self.backend.handle_empty(response).await?;
        Ok(())
    }

    /// Ask the service to email a password reset link.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let url = self.backend.auth_url("recover");
        let response = self
            .backend
            .request(Method::POST, &url, None)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(ServiceError::from)?;

        self.backend.handle_empty(response).await?;
        Ok(())
    }

    /// Re-send the sign-up confirmation email.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let url = self.backend.auth_url("resend");
        let response = self
            .backend
            .request(Method::POST, &url, None)
            .json(&json!({ "type": "signup", "email": email }))
            .send()
            .await
            .map_err(ServiceError::from)?;

        self.backend.handle_empty(response).await?;
        Ok(())
    }

    /// Revoke the session. A token the service no longer knows counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.backend.auth_url("logout");
        let response = self
            .backend
            .request(Method::POST, &url, Some(access_token))
            .send()
            .await
            .map_err(ServiceError::from)?;

        match self.backend.handle_empty(response).await {
            Ok(()) | Err(ServiceError::Unauthorized(_)) | Err(ServiceError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_error_keeps_message() {
        let err = credentials_error(ServiceError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        });
        assert!(matches!(err, AuthError::InvalidCredentials(ref m) if m == "Invalid login credentials"));

        let err = credentials_error(ServiceError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(err, AuthError::Service(_)));
    }

    #[test]
    fn test_signup_response_shapes() {
        let bare: SignUpResponse =
            serde_json::from_value(json!({ "id": "u1", "email": "a@b.c" })).unwrap();
        assert!(matches!(bare, SignUpResponse::User(ref u) if u.id == "u1"));

        let with_session: SignUpResponse = serde_json::from_value(json!({
            "access_token": "t",
            "user": { "id": "u2", "email": "a@b.c", "user_metadata": {} }
        }))
        .unwrap();
        assert!(matches!(with_session, SignUpResponse::Session { ref user } if user.id == "u2"));
    }

    #[test]
    fn test_auth_user_profile() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
            "email_confirmed_at": "2026-01-01T00:00:00Z",
            "user_metadata": { "language": "zh", "is_admin": true }
        }))
        .unwrap();
        let profile = user.into_profile();
        assert!(profile.email_verified);
        assert!(profile.is_admin);
        assert_eq!(profile.language, workdesk_i18n::Language::Zh);
    }
}
