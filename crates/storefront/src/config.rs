//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `SANITY_PROJECT_ID` - Sanity project id
//! - `SANITY_DATASET` - Sanity dataset (e.g., production)
//! - `SANITY_API_TOKEN` - Sanity write token (webhook order creation)
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//! - `CLERK_FRONTEND_API` - Clerk frontend API domain (e.g., clerk.stridesports.dev)
//! - `CLERK_OAUTH_CLIENT_ID` - Clerk OAuth client ID
//! - `CLERK_OAUTH_CLIENT_SECRET` - Clerk OAuth client secret
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SANITY_API_VERSION` - API version date (default: 2024-01-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Sanity content backend configuration
    pub sanity: SanityConfig,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Clerk identity provider configuration
    pub clerk: ClerkConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Sanity content backend configuration.
///
/// Implements `Debug` manually to redact the write token.
#[derive(Clone)]
pub struct SanityConfig {
    /// Sanity project id (e.g., a1b2c3d4)
    pub project_id: String,
    /// Dataset name (e.g., production)
    pub dataset: String,
    /// API version date (e.g., 2024-01-01)
    pub api_version: String,
    /// Write token for order/address mutations (server-side only)
    pub api_token: SecretString,
}

impl std::fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Stripe payment processor configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key (sk_live_... / sk_test_...)
    pub secret_key: SecretString,
    /// Webhook signing secret (whsec_...)
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// Clerk identity provider configuration.
#[derive(Clone)]
pub struct ClerkConfig {
    /// Clerk frontend API domain (e.g., clerk.stridesports.dev)
    pub frontend_api: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ClerkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkConfig")
            .field("frontend_api", &self.frontend_api)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_base_url("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let sanity = SanityConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;
        let clerk = ClerkConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            sanity,
            stripe,
            clerk,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SanityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: get_required_env("SANITY_PROJECT_ID")?,
            dataset: get_required_env("SANITY_DATASET")?,
            api_version: get_env_or_default("SANITY_API_VERSION", "2024-01-01"),
            api_token: get_validated_secret("SANITY_API_TOKEN")?,
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
        })
    }
}

impl ClerkConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            frontend_api: get_required_env("CLERK_FRONTEND_API")?,
            client_id: get_required_env("CLERK_OAUTH_CLIENT_ID")?,
            client_secret: get_validated_secret("CLERK_OAUTH_CLIENT_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., STOREFRONT_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get the public base URL, validated and normalized (no trailing slash).
///
/// Redirect URIs and webhook success URLs are derived from this value, so a
/// malformed one should fail startup rather than break checkout later.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    let parsed = url::Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must have a host".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            sanity: SanityConfig {
                project_id: "a1b2c3d4".to_string(),
                dataset: "production".to_string(),
                api_version: "2024-01-01".to_string(),
                api_token: SecretString::from("sk-sanity-token"),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_abc"),
                webhook_secret: SecretString::from("whsec_abc"),
            },
            clerk: ClerkConfig {
                frontend_api: "clerk.test.dev".to_string(),
                client_id: "client_id".to_string(),
                client_secret: SecretString::from("client_secret_value"),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_sanity_config_debug_redacts_token() {
        let config = SanityConfig {
            project_id: "a1b2c3d4".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            api_token: SecretString::from("super_secret_write_token"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("a1b2c3d4"));
        assert!(debug_output.contains("production"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_write_token"));
    }

    #[test]
    fn test_stripe_config_debug_redacts_secrets() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_live_very_secret"),
            webhook_secret: SecretString::from("whsec_very_secret"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_very_secret"));
        assert!(!debug_output.contains("whsec_very_secret"));
    }
}
