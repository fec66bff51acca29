//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Security headers (CSP, isolation headers)
//! 6. Rate limiting (governor, auth + checkout endpoints)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireApiAuth, RequireAuth, clear_current_customer, set_current_customer};
pub use rate_limit::{auth_rate_limiter, checkout_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
