//! Clerk OAuth route handlers.
//!
//! Handles the OAuth flow for customer sign-in:
//! - Login: Redirects to Clerk's hosted sign-in page
//! - Callback: Validates state, exchanges the code, stores the customer
//! - Logout: Clears the session customer

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Initiate Clerk OAuth sign-in.
///
/// Generates a state parameter, stores it in the session, and redirects to
/// Clerk's authorization page.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    // Generate CSRF state
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::CLERK_OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    // Build the redirect URI
    let redirect_uri = format!("{}/auth/callback", state.config().base_url);

    // Generate and redirect to authorization URL
    let auth_url = state
        .identity()
        .authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Clerk OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code for a
/// token, fetches the user profile, and stores it as the current customer.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for OAuth errors from Clerk
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Clerk OAuth error: {} - {}", error, description);
        return Redirect::to("/?error=sign_in_denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Clerk OAuth callback missing code");
        return Redirect::to("/?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Clerk OAuth callback missing state");
        return Redirect::to("/?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::CLERK_OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Clerk OAuth state mismatch");
        return Redirect::to("/?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session
        .remove::<String>(session_keys::CLERK_OAUTH_STATE)
        .await;

    // Build redirect URI (must match the one used in authorization request)
    let redirect_uri = format!("{}/auth/callback", state.config().base_url);

    // Exchange code for a token
    let token = match state.identity().exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange Clerk OAuth code: {}", e);
            return Redirect::to("/?error=token_exchange").into_response();
        }
    };

    // Fetch the user profile
    let profile = match state.identity().fetch_user(&token.access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch Clerk user profile: {}", e);
            return Redirect::to("/?error=profile").into_response();
        }
    };

    let customer = CurrentCustomer {
        id: profile.user_id,
        email: profile.email,
        name: profile.name,
    };

    // Store the customer in the session
    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!("Failed to store customer in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    tracing::info!("Customer signed in");

    Redirect::to("/").into_response()
}

/// Sign out the current customer.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Response {
    clear_current_customer(&session).await;
    Redirect::to("/").into_response()
}
