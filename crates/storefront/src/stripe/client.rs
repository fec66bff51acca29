//! Stripe API client.
//!
//! Talks to the REST API directly with `reqwest`. Stripe's request encoding
//! is `application/x-www-form-urlencoded` with bracketed array/object keys,
//! so parameters are assembled as flat key/value pairs.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use stride_core::CheckoutSessionId;

use super::StripeError;
use crate::config::StripeConfig;

/// Stripe REST API base URL.
const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// A line item for a hosted checkout session.
#[derive(Debug, Clone)]
pub struct LineItem {
    /// Product display name shown on the Stripe page.
    pub name: String,
    /// Product image shown on the Stripe page.
    pub image_url: Option<String>,
    /// Unit price in minor currency units.
    pub unit_amount: i64,
    /// Lowercase ISO currency code.
    pub currency: String,
    /// Quantity purchased.
    pub quantity: u32,
}

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSession {
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Carried through to the webhook as `client_reference_id`.
    pub client_reference_id: String,
    pub customer_email: Option<String>,
    /// Metadata entries attached to the session.
    pub metadata: Vec<(String, String)>,
}

/// The created session, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    pub id: CheckoutSessionId,
    #[serde(default)]
    pub url: Option<String>,
}

/// Error envelope returned by the Stripe API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Stripe API.
#[derive(Clone)]
pub struct CheckoutClient {
    client: reqwest::Client,
    secret_key: SecretString,
}

impl std::fmt::Debug for CheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CheckoutClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Create a hosted checkout session and return its redirect URL.
    ///
    /// Each call carries a fresh idempotency key: a retried request creates
    /// at most one session on Stripe's side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Stripe rejects the
    /// parameters, or the created session has no redirect URL.
    #[instrument(skip(self, params), fields(line_items = params.line_items.len()))]
    pub async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession,
    ) -> Result<CheckoutSessionResponse, StripeError> {
        let form = build_session_form(params);

        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(self.secret_key.expose_secret())
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&response_text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| response_text.chars().take(200).collect());
            tracing::error!(
                status = %status,
                message = %message,
                "Stripe API returned non-success status"
            );
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSessionResponse = serde_json::from_str(&response_text)?;

        if session.url.is_none() {
            return Err(StripeError::MissingRedirectUrl);
        }

        debug!(session_id = %session.id, "Checkout session created");

        Ok(session)
    }
}

/// Flatten session parameters into Stripe's bracketed form encoding.
fn build_session_form(params: &CreateCheckoutSession) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
        (
            "client_reference_id".to_string(),
            params.client_reference_id.clone(),
        ),
    ];

    if let Some(email) = &params.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }

    for (key, value) in &params.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    for (i, item) in params.line_items.iter().enumerate() {
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        form.push((
            format!("line_items[{i}][price_data][currency]"),
            item.currency.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = &item.image_url {
            form.push((
                format!("line_items[{i}][price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> CreateCheckoutSession {
        CreateCheckoutSession {
            line_items: vec![
                LineItem {
                    name: "Trail Runner GTX".to_string(),
                    image_url: Some("https://cdn.sanity.io/shoe.jpg".to_string()),
                    unit_amount: 12999,
                    currency: "usd".to_string(),
                    quantity: 2,
                },
                LineItem {
                    name: "Grip Socks".to_string(),
                    image_url: None,
                    unit_amount: 900,
                    currency: "usd".to_string(),
                    quantity: 1,
                },
            ],
            success_url: "https://shop.test/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://shop.test/cart".to_string(),
            client_reference_id: "user_abc".to_string(),
            customer_email: Some("jess@example.com".to_string()),
            metadata: vec![
                ("v".to_string(), "1".to_string()),
                ("products".to_string(), "[{\"id\":\"p1\",\"quantity\":2}]".to_string()),
            ],
        }
    }

    fn lookup<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_form_encodes_line_items_with_brackets() {
        let form = build_session_form(&sample_params());

        assert_eq!(lookup(&form, "mode"), Some("payment"));
        assert_eq!(lookup(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            lookup(&form, "line_items[0][price_data][unit_amount]"),
            Some("12999")
        );
        assert_eq!(
            lookup(&form, "line_items[0][price_data][product_data][name]"),
            Some("Trail Runner GTX")
        );
        assert_eq!(
            lookup(&form, "line_items[1][price_data][unit_amount]"),
            Some("900")
        );
        // Second item has no image, so no images key is emitted for it
        assert!(lookup(&form, "line_items[1][price_data][product_data][images][0]").is_none());
    }

    #[test]
    fn test_form_carries_identity_and_metadata() {
        let form = build_session_form(&sample_params());

        assert_eq!(lookup(&form, "client_reference_id"), Some("user_abc"));
        assert_eq!(lookup(&form, "customer_email"), Some("jess@example.com"));
        assert_eq!(lookup(&form, "metadata[v]"), Some("1"));
        assert!(lookup(&form, "metadata[products]").is_some());
    }
}
