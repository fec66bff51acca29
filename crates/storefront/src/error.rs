//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::sanity::ContentError;
use crate::stripe::StripeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Sanity content backend operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Stripe API operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Content(_) | Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal and upstream details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Content(_) => "Content service error".to_string(),
            Self::Payment(_) => "Payment service error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture server-class errors to Sentry with the triggering request logged.
    fn capture(&self) {
        if matches!(
            self,
            Self::Session(_)
                | Self::Internal(_)
                | Self::Content(_)
                | Self::Payment(_)
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.capture();
        (self.status(), self.public_message()).into_response()
    }
}

/// JSON-bodied wrapper for API endpoints.
///
/// The checkout endpoint contract is `{ "error": "..." }` with a non-2xx
/// status; HTML routes use the plain [`AppError`] responder instead.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.capture();
        let status = self.0.status();
        let body = Json(serde_json::json!({ "error": self.0.public_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_api_error_json_body() {
        let response = ApiError(AppError::Unauthorized("sign in required".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
