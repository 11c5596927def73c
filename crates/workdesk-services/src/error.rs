//! Backend service error types.

use thiserror::Error;
use workdesk_core::{AppError, NetworkError, ReqwestErrorExt, ValidationError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Backend is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response. `message` is the backend's own text.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Network(err.into_network_error())
        }
    }
}

impl ServiceError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "The backend is not configured.".to_string(),
            Self::Network(e) => e.user_message().to_string(),
            Self::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::Forbidden(_) => "You don't have permission to do that.".to_string(),
            Self::NotFound(_) => "The requested item no longer exists.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Decode(_) => "Received an unexpected response. Please try again.".to_string(),
            Self::Validation(e) => e.user_message().to_string(),
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Network(NetworkError::ServerError { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotConfigured => {
                AppError::Config(workdesk_core::ConfigError::MissingSetting(
                    "backend.url".to_string(),
                ))
            }
            ServiceError::Network(e) => AppError::Network(e),
            ServiceError::Unauthorized(msg) => AppError::Authentication(msg),
            ServiceError::Forbidden(msg) => AppError::Authorization(msg),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            ServiceError::Decode(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
            ServiceError::Validation(e) => AppError::Validation(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_is_shown_verbatim() {
        let err = ServiceError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = ServiceError::Forbidden("row".into()).into();
        assert!(matches!(app, AppError::Authorization(_)));

        let app: AppError = ServiceError::Unauthorized("jwt expired".into()).into();
        assert!(matches!(app, AppError::Authentication(_)));

        let app: AppError = ServiceError::Validation(ValidationError::PasswordMismatch).into();
        assert!(matches!(app, AppError::Validation(ValidationError::PasswordMismatch)));
    }
}
