//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /shop                   - Product listing
//! GET  /products/{slug}        - Product detail
//! GET  /sports/{slug}          - Category landing page
//! GET  /search?q=              - Product search
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/checkout          - Begin checkout (redirects to Stripe)
//!
//! # Checkout
//! POST /api/checkout/session   - Create hosted checkout session (JSON)
//! GET  /checkout/success       - Post-payment landing page
//!
//! # Webhooks
//! POST /webhooks/stripe        - Stripe event receiver (raw body)
//!
//! # Wishlist (requires auth)
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Toggle a product
//!
//! # Account (requires auth)
//! GET  /account/orders         - Order history
//!
//! # Auth (delegated to Clerk)
//! GET  /auth/login             - Redirect to Clerk sign-in
//! GET  /auth/callback          - Handle OAuth callback
//! POST /auth/logout            - Sign out
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod products;
pub mod search;
pub mod webhooks;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

/// Create the auth routes router (rate limited against abuse).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
        .layer(middleware::auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/shop", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/sports/{slug}", get(categories::show))
        .route("/search", get(search::page))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route(
            "/api/checkout/session",
            post(checkout::create_session).layer(middleware::checkout_rate_limiter()),
        )
        .route("/checkout/success", get(checkout::success))
        // Stripe webhook (raw body; never rate limited)
        .route("/webhooks/stripe", post(webhooks::stripe_webhook))
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Account
        .route("/account/orders", get(account::orders))
        // Auth
        .nest("/auth", auth_routes())
}
