//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! carries the signed-in customer, the cart line list, and wishlist ids.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "stride_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store backed by `PostgreSQL`.
///
/// The sessions table is created by calling `migrate()` on the returned
/// store during startup - it is the only schema this application owns.
#[must_use]
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Create the session layer around an existing store.
///
/// # Arguments
///
/// * `store` - `PostgreSQL` session store
/// * `config` - Storefront configuration (for cookie security)
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
