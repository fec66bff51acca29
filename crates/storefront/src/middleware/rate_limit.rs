//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Provides configurable rate limiters for different endpoint categories:
//! - `auth_rate_limiter`: Strict limits for the sign-in flow (~10/min)
//! - `checkout_rate_limiter`: Limits for checkout-session creation (~30/min)
//!
//! The webhook endpoint is deliberately NOT rate limited - Stripe retries
//! on 429 and a burst of legitimate event deliveries is normal.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Custom IP Key Extractor for proxied deployments
// =============================================================================

/// Key extractor that checks upstream proxy headers for the real client IP
/// before falling back to the socket address.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // Try CF-Connecting-IP first (Cloudflare's real client IP)
        if let Some(ip) = headers
            .get("cf-connecting-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Try Fly-Client-IP (Fly.io's header)
        if let Some(ip) = headers
            .get("fly-client-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers, which are always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for checkout-session creation: ~30 requests per
/// minute per IP.
///
/// Configuration: 1 request every 2 seconds (replenish), burst of 10.
/// Creating a hosted session hits both Sanity and Stripe, so this is kept
/// tighter than a general API limit.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers, which are always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn checkout_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(2) // Replenish 1 token every 2 seconds (~30/minute)
        .burst_size(10) // Allow burst of 10 requests
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(10) is valid");
    GovernorLayer::new(Arc::new(config))
}
