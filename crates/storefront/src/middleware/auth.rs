//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.
//! The identity itself comes from Clerk; these extractors only read the
//! session state written by the OAuth callback.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a signed-in customer on HTML routes.
///
/// If the customer is not signed in, returns a redirect to the sign-in
/// flow.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Orders for {}", customer.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Extractor that requires a signed-in customer on JSON API routes.
///
/// Responds `401 {"error": "..."}` instead of redirecting.
pub struct RequireApiAuth(pub CurrentCustomer);

/// Extractor that yields the customer when signed in, `None` otherwise.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

/// Error returned when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to the sign-in flow (for HTML requests).
    RedirectToLogin,
    /// Unauthorized JSON response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "You must be signed in to check out" })),
            )
                .into_response(),
        }
    }
}

async fn current_customer(parts: &mut Parts) -> Option<CurrentCustomer> {
    // The session is placed in extensions by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;

    session
        .get(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_customer(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireApiAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_customer(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_customer(parts).await))
    }
}

/// Store the signed-in customer in the session.
///
/// Called by the OAuth callback after a successful code exchange.
///
/// # Errors
///
/// Returns an error if the session write fails.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Remove the signed-in customer from the session (sign-out).
pub async fn clear_current_customer(session: &Session) {
    let _ = session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await;
}
