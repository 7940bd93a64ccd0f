//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON `{"error": message, "timestamp": rfc3339}` - the
//! shape the signup pages and the payment processor's webhook log expect.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use curbside_core::{LineItemError, SelectionError};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::stripe::StripeError;

/// Application-level error type for the signup service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Webhook signature did not verify.
    #[error("signature verification failed")]
    SignatureVerification,

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Stripe API operation failed.
    #[error("stripe error: {0}")]
    Stripe(#[from] StripeError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<LineItemError> for AppError {
    fn from(err: LineItemError) -> Self {
        // A hole in the price table is a deployment problem, not the
        // customer's.
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Stripe(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::SignatureVerification | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Stripe(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Stripe(_) => "Payment service error".to_string(),
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use curbside_core::ServiceType;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing address".to_string());
        assert_eq!(err.to_string(), "bad request: missing address");

        let err = AppError::SignatureVerification;
        assert_eq!(err.to_string(), "signature verification failed");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::SignatureVerification),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_selection_error_maps_to_bad_request() {
        let err: AppError = SelectionError::MissingDay {
            service: ServiceType::Trash,
        }
        .into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
