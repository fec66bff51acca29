//! Database operations for storefront `PostgreSQL`.
//!
//! Sanity is the system of record for products, brands, categories, and
//! orders; `PostgreSQL` holds only what cannot live there:
//!
//! ## Tables
//!
//! - `tower_sessions.session` - session storage (signed-in customer, cart
//!   lines, wishlist ids)
//!
//! The session schema is applied at startup via the session store's
//! `migrate()` - there are no other migrations to run.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
