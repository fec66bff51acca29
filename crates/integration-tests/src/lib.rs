//! Integration tests for Stride Sports.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and the storefront
//! cargo run -p stride-storefront
//!
//! # Run integration tests against the live server
//! cargo test -p stride-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout_session` - Checkout initiation endpoint tests
//! - `stripe_webhook` - Webhook signature and order-creation tests
//!
//! All tests are `#[ignore]`-gated because they require a running storefront
//! (`STOREFRONT_BASE_URL`, default `http://localhost:3000`) and, for the
//! webhook suite, the server's webhook signing secret
//! (`STRIPE_WEBHOOK_SECRET`).
