//! Stripe payment processor integration.
//!
//! This module provides:
//! - [`CheckoutClient`] for creating hosted checkout sessions
//! - Event types for inbound webhook payloads
//! - Webhook signature verification against the raw request body
//!
//! # Flow
//!
//! 1. The checkout initiator creates a hosted session and redirects the
//!    customer to Stripe
//! 2. Stripe handles card entry and payment on its own pages
//! 3. Stripe pushes a signed `checkout.session.completed` event to the
//!    webhook endpoint
//! 4. The webhook handler verifies the signature and records the order

mod client;
pub mod types;
pub mod webhook;

pub use client::{CheckoutClient, CreateCheckoutSession, LineItem};
pub use types::{CheckoutSession, Event};

use thiserror::Error;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("Stripe API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by Stripe.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Webhook signature header is missing, malformed, stale, or wrong.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The created session came back without a redirect URL.
    #[error("Checkout session has no redirect URL")]
    MissingRedirectUrl,
}
