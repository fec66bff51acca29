//! Wire types for Stripe webhook events and checkout sessions.
//!
//! Only the fields this storefront reads are modeled; everything else in the
//! event payload is ignored by serde.

use std::collections::HashMap;

use serde::Deserialize;

use stride_core::{CheckoutSessionId, PaymentIntentId};

/// An inbound Stripe webhook event.
///
/// `data.object` stays as raw JSON until the handler has branched on the
/// event type; only `checkout.session.completed` payloads are deserialized
/// further.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event id (evt_...).
    pub id: String,
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event payload.
    pub data: EventData,
}

/// The `data` envelope of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The API object the event describes, kept raw until dispatch.
    pub object: serde_json::Value,
}

impl Event {
    /// Deserialize the event payload as a checkout session.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the payload does not have the checkout
    /// session shape.
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// The `id` field of the payload object, for log lines on events that
    /// are acknowledged but not otherwise handled.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }
}

/// A checkout session as delivered in `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session id (cs_...).
    pub id: CheckoutSessionId,
    /// The value passed as `client_reference_id` at session creation -
    /// this storefront puts the Clerk user id there.
    #[serde(default)]
    pub client_reference_id: Option<String>,
    /// Stripe customer id (cus_...).
    #[serde(default)]
    pub customer: Option<String>,
    /// Payment intent id (pi_...).
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentId>,
    /// Grand total in minor currency units.
    #[serde(default)]
    pub amount_total: Option<i64>,
    /// Lowercase ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Discount/tax/shipping breakdown.
    #[serde(default)]
    pub total_details: Option<TotalDetails>,
    /// Customer contact details collected by the hosted page.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Shipping details collected by the hosted page.
    #[serde(default)]
    pub shipping_details: Option<ShippingDetails>,
    /// Metadata attached at session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// The `total_details` breakdown on a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalDetails {
    /// Discount applied, in minor currency units.
    #[serde(default)]
    pub amount_discount: Option<i64>,
}

/// Customer contact details on a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Shipping details on a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<ShippingAddress>,
}

/// A shipping address on a checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_event_json() -> serde_json::Value {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "client_reference_id": "user_abc",
                    "customer": "cus_1",
                    "payment_intent": "pi_1",
                    "amount_total": 4000,
                    "currency": "usd",
                    "total_details": { "amount_discount": 500 },
                    "customer_details": { "email": "jess@example.com", "name": "Jess" },
                    "shipping_details": {
                        "name": "Jess",
                        "address": {
                            "line1": "1 Main St",
                            "city": "Denver",
                            "state": "CO",
                            "postal_code": "80202"
                        }
                    },
                    "metadata": { "v": "1", "products": "[{\"id\":\"p1\",\"quantity\":2}]" }
                }
            }
        })
    }

    #[test]
    fn test_event_deserialize_and_session_parse() {
        let event: Event = serde_json::from_value(completed_event_json()).expect("event");
        assert_eq!(event.kind, "checkout.session.completed");
        assert_eq!(event.object_id(), Some("cs_test_1"));

        let session = event.checkout_session().expect("session");
        assert_eq!(session.id.as_str(), "cs_test_1");
        assert_eq!(session.amount_total, Some(4000));
        assert_eq!(session.currency.as_deref(), Some("usd"));
        assert_eq!(
            session.total_details.and_then(|t| t.amount_discount),
            Some(500)
        );
        assert_eq!(session.metadata.get("v").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_event_with_sparse_session() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "evt_2",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_2" } }
        }))
        .expect("event");

        let session = event.checkout_session().expect("session");
        assert!(session.customer.is_none());
        assert!(session.shipping_details.is_none());
        assert!(session.metadata.is_empty());
    }
}
