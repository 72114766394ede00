//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! error is presented to the client: every failure becomes an error notice,
//! and sign-in failures also carry a persistent banner for the login view.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mentor_booking_core::{ActionError, AuthError, Notice, PortError};
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::web::dto::ErrorResponse;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Sign-up or sign-in was rejected by the identity provider.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// A dashboard action was refused or failed.
    #[error("{0}")]
    Action(#[from] ActionError),

    /// The request carried no valid auth session.
    #[error("Please login first")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::AccountExists(_)) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::Provider(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Unauthenticated | ApiError::Port(PortError::Unauthorized) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Action(e) => match e {
                ActionError::Forbidden(_) | ActionError::NotOwner(_) => StatusCode::FORBIDDEN,
                ActionError::AlreadyRequested
                | ActionError::InvalidTransition(_)
                | ActionError::AlreadyCancelled => StatusCode::CONFLICT,
                ActionError::SlotUnavailable | ActionError::Missing(_) => StatusCode::NOT_FOUND,
                ActionError::ConfirmationRequired | ActionError::Invalid(_) => {
                    StatusCode::BAD_REQUEST
                }
                ActionError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the user. Internal details stay in the logs.
    pub fn notice(&self) -> Notice {
        match self {
            ApiError::Auth(_)
            | ApiError::Action(_)
            | ApiError::Unauthenticated
            | ApiError::BadRequest(_) => Notice::error(self.to_string()),
            ApiError::Port(PortError::NotFound(_)) => Notice::error("Not found."),
            ApiError::Port(PortError::Unauthorized) => Notice::error("Please login first"),
            _ => Notice::error("Something went wrong. Please try again."),
        }
    }

    /// Sign-in failures stay visible on the login view until the next attempt.
    pub fn banner(&self) -> Option<String> {
        match self {
            ApiError::Auth(e) => Some(format!("Login Error: {}", e)),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        } else {
            warn!(status = %status, "Request rejected: {}", self);
        }

        let body = ErrorResponse {
            notice: self.notice().into(),
            banner: self.banner(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_booking_core::Role;

    #[test]
    fn auth_failures_carry_a_banner() {
        let err = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.notice().message, "Invalid email or password");
        assert_eq!(
            err.banner().as_deref(),
            Some("Login Error: Invalid email or password")
        );
    }

    #[test]
    fn action_failures_are_notice_only() {
        let err = ApiError::from(ActionError::AlreadyRequested);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.notice().message, "You already requested this slot.");
        assert!(err.banner().is_none());

        let err = ApiError::from(ActionError::Forbidden(Role::Teacher));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = ApiError::from(ActionError::SlotUnavailable);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failures_hide_internal_detail() {
        let err = ApiError::from(ActionError::Store {
            context: "Error creating slot",
            source: PortError::Unexpected("pool timed out".to_string()),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.notice().message, "Error creating slot");

        let err = ApiError::from(PortError::Unexpected("pool timed out".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.notice().message.contains("pool"));
    }
}
