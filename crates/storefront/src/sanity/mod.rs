//! Sanity content backend client.
//!
//! # Architecture
//!
//! - GROQ queries over Sanity's HTTP API - no local sync, Sanity is the
//!   system of record for products, brands, categories, and orders
//! - Reads go through the CDN endpoint and are cached in-memory via `moka`
//!   (5 minute TTL)
//! - Writes (order/address creation from the Stripe webhook) go through the
//!   non-CDN endpoint with the API token
//!
//! # Example
//!
//! ```rust,ignore
//! use stride_storefront::sanity::ContentClient;
//!
//! let client = ContentClient::new(&config.sanity);
//!
//! // Get a product
//! let product = client.get_product_by_slug("trail-runner-gtx").await?;
//!
//! // Validate checkout submissions against the authoritative records
//! let authoritative = client.get_products_by_ids(&ids).await?;
//! ```

mod cache;
mod client;
pub mod queries;
pub mod types;

pub use client::ContentClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the Sanity API.
#[derive(Debug, Error)]
pub enum ContentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("Sanity API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by Sanity.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Requested document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}
