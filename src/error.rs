use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// Error taxonomy for the party lifecycle. Every rejected operation
/// carries a human-readable reason; none of these terminate the
/// process. Delivery failures are not represented here: they are
/// caught and logged at the outbound call site and never roll back a
/// state transition.
#[derive(Debug, Error)]
pub enum PartyError {
    /// Malformed or out-of-range user input; reported to the caller,
    /// never logged as a system fault.
    #[error("{0}")]
    Validation(String),

    /// Wrong caller for a role-restricted action.
    #[error("{0}")]
    Permission(String),

    /// Stale reference to a party that no longer exists.
    #[error("{0}")]
    NotFound(String),

    /// Operation attempted on an already-completed party.
    #[error("this party has already been completed")]
    AlreadyCompleted,

    /// Unexpected internal fault, converted to a generic reported
    /// error instead of reaching the transport layer.
    #[error("an internal error occurred, please try again later")]
    Internal(String),
}

impl PartyError {
    pub fn code(&self) -> i32 {
        match self {
            PartyError::Validation(_) => error_codes::VALIDATION_ERROR,
            PartyError::Permission(_) => error_codes::PERMISSION_DENIED,
            PartyError::NotFound(_) => error_codes::NOT_FOUND,
            PartyError::AlreadyCompleted => error_codes::ALREADY_COMPLETED,
            PartyError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            PartyError::Validation(_) => StatusCode::BAD_REQUEST,
            PartyError::Permission(_) => StatusCode::FORBIDDEN,
            PartyError::NotFound(_) => StatusCode::NOT_FOUND,
            PartyError::AlreadyCompleted => StatusCode::CONFLICT,
            PartyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PartyError {
    fn into_response(self) -> Response {
        if let PartyError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "internal error");
        }
        let body = error_to_api_response::<()>(self.code(), self.to_string());
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        assert_eq!(
            PartyError::Validation("x".into()).code(),
            error_codes::VALIDATION_ERROR
        );
        assert_eq!(
            PartyError::Permission("x".into()).code(),
            error_codes::PERMISSION_DENIED
        );
        assert_eq!(
            PartyError::NotFound("x".into()).code(),
            error_codes::NOT_FOUND
        );
        assert_eq!(
            PartyError::AlreadyCompleted.code(),
            error_codes::ALREADY_COMPLETED
        );
    }

    #[test]
    fn internal_detail_is_not_shown_to_the_caller() {
        let message = PartyError::Internal("lock poisoned".into()).to_string();
        assert!(!message.contains("lock poisoned"));
    }
}
