//! Clerk identity provider client.
//!
//! Sign-in is fully delegated to Clerk: the storefront never sees
//! credentials. Clerk acts as an OAuth 2.0 / OIDC provider and this client
//! drives the authorization-code flow.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the customer to Clerk's hosted sign-in page
//! 3. Clerk redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Fetch the user's profile with `fetch_user()` and store it in the
//!    session as the current customer
//!
//! # Example
//!
//! ```rust,ignore
//! use stride_storefront::clerk::IdentityClient;
//!
//! let client = IdentityClient::new(&config.clerk);
//!
//! let auth_url = client.authorization_url("https://shop.test/auth/callback", &state);
//! // ... after the callback:
//! let token = client.exchange_code(&code, "https://shop.test/auth/callback").await?;
//! let profile = client.fetch_user(&token.access_token).await?;
//! ```

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use stride_core::CustomerId;

use crate::config::ClerkConfig;

/// Errors that can occur during the Clerk OAuth flow.
#[derive(Debug, Error)]
pub enum ClerkError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token exchange or userinfo request was rejected.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// Tokens obtained from the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// The authenticated user's profile from the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    /// Clerk user id (`user_...`), delivered as the OIDC subject.
    #[serde(rename = "sub")]
    pub user_id: CustomerId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Client for Clerk's OAuth endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    frontend_api: String,
    client_id: String,
    client_secret: String,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &ClerkConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                frontend_api: config.frontend_api.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// Generate the authorization URL for customer sign-in.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after sign-in
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "https://{}/oauth/authorize?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            self.inner.frontend_api,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, ClerkError> {
        let url = format!("https://{}/oauth/token", self.inner.frontend_api);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClerkError::OAuth(format!("Token exchange failed: {text}")));
        }

        Ok(response.json().await?)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, ClerkError> {
        let url = format!("https://{}/oauth/userinfo", self.inner.frontend_api);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClerkError::OAuth(format!("Userinfo failed: {text}")));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> IdentityClient {
        IdentityClient::new(&ClerkConfig {
            frontend_api: "clerk.stridesports.dev".to_string(),
            client_id: "client with spaces".to_string(),
            client_secret: SecretString::from("cs_secret"),
        })
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = client().authorization_url("https://shop.test/auth/callback", "st/ate");

        assert!(url.starts_with("https://clerk.stridesports.dev/oauth/authorize?"));
        assert!(url.contains("client_id=client%20with%20spaces"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fshop.test%2Fauth%2Fcallback"));
        assert!(url.contains("state=st%2Fate"));
        assert!(url.contains("scope=openid%20email%20profile"));
    }

    #[test]
    fn test_user_profile_deserializes_oidc_subject() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"sub":"user_2abc","email":"jess@example.com","name":"Jess"}"#,
        )
        .expect("profile");

        assert_eq!(profile.user_id.as_str(), "user_2abc");
        assert_eq!(profile.email.as_deref(), Some("jess@example.com"));
    }
}
