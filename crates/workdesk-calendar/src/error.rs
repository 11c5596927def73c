//! Calendar-specific error types.

use thiserror::Error;
use workdesk_core::{AppError, ValidationError};
use workdesk_services::ServiceError;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("User not authenticated")]
    Unauthenticated,

    /// The event belongs to another user.
    #[error("Not allowed to modify event: {0}")]
    Unauthorized(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Backend error: {0}")]
    Service(ServiceError),
}

impl From<ServiceError> for CalendarError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Forbidden(msg) => Self::Unauthorized(msg),
            ServiceError::Unauthorized(_) => Self::Unauthenticated,
            ServiceError::Validation(e) => Self::Validation(e),
            other => Self::Service(other),
        }
    }
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in to manage your calendar.".to_string(),
            Self::Unauthorized(_) => "You can only change your own events.".to_string(),
            Self::EventNotFound(_) => "Event not found".to_string(),
            Self::InvalidEventData(msg) => format!("Invalid event: {}", msg),
            Self::Validation(e) => e.user_message().to_string(),
            Self::Service(e) => e.user_message(),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::Unauthenticated => {
                AppError::Authentication("User not authenticated".to_string())
            }
            CalendarError::Unauthorized(msg) => AppError::Authorization(msg),
            CalendarError::EventNotFound(id) => AppError::NotFound(id),
            CalendarError::InvalidEventData(msg) => {
                AppError::Network(workdesk_core::NetworkError::InvalidResponse(msg))
            }
            CalendarError::Validation(e) => AppError::Validation(e),
            CalendarError::Service(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        assert!(CalendarError::Unauthenticated.user_message().contains("sign in"));
        assert!(CalendarError::Unauthorized("e1".into())
            .user_message()
            .contains("your own"));
    }

    #[test]
    fn test_forbidden_becomes_unauthorized() {
        let err: CalendarError = ServiceError::Forbidden("rls".into()).into();
        assert!(matches!(err, CalendarError::Unauthorized(_)));

        let err: CalendarError = ServiceError::Unauthorized("jwt expired".into()).into();
        assert!(matches!(err, CalendarError::Unauthenticated));
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = CalendarError::Unauthorized("e1".into()).into();
        assert!(matches!(app, AppError::Authorization(_)));
        let app: AppError = CalendarError::EventNotFound("e1".into()).into();
        assert!(matches!(app, AppError::NotFound(_)));
    }
}
