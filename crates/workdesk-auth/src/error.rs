//! Authentication error types.

use thiserror::Error;
use workdesk_core::{AppError, ValidationError};
use workdesk_services::ServiceError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Carries the backend's message verbatim.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("No user signed in")]
    NotSignedIn,

    #[error("{0}")]
    UserExists(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Backend error: {0}")]
    Service(ServiceError),
}

impl From<ServiceError> for AuthError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized(_) => Self::SessionExpired,
            ServiceError::Validation(e) => Self::Validation(e),
            other => Self::Service(other),
        }
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl AuthError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials(msg) | Self::UserExists(msg) => msg.clone(),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::NotSignedIn => "Please sign in to continue.".to_string(),
            Self::Validation(e) => e.user_message().to_string(),
            Self::Storage(_) => "Local storage error".to_string(),
            Self::Service(e) => e.user_message(),
        }
    }

    /// Whether the stored session should be discarded.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotSignedIn)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials(msg) => AppError::Authentication(msg),
            AuthError::SessionExpired => AppError::Authentication("Session expired".to_string()),
            AuthError::NotSignedIn => AppError::Authentication("No user signed in".to_string()),
            AuthError::UserExists(msg) => AppError::Other(anyhow::anyhow!(msg)),
            AuthError::Validation(e) => AppError::Validation(e),
            AuthError::Storage(msg) => AppError::Other(anyhow::anyhow!(msg)),
            AuthError::Service(e) => e.into(),
        }
    }
}
