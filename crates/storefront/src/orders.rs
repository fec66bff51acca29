//! Order construction from completed checkout sessions.
//!
//! Maps a verified `checkout.session.completed` payload plus its parsed
//! metadata into the order document written to the content backend. The
//! document id is derived from the checkout session id, so writing with
//! `createIfNotExists` makes webhook redelivery a safe no-op.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;

use stride_core::{CheckoutSessionId, Currency, OrderStatus, Price};

use crate::checkout::CheckoutMetadata;
use crate::sanity::types::{OrderAddress, OrderDocument, OrderProductEntry, Reference};
use crate::stripe::CheckoutSession;

/// Characters used in generated order-number suffixes.
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random order-number suffix.
const SUFFIX_LENGTH: usize = 9;

/// Generate an order number: `ORD-<unix millis>-<random suffix>`.
///
/// There is no server-side uniqueness check; collisions are negligible and
/// nothing keys on the order number (idempotency rests on the session id).
#[must_use]
pub fn generate_order_number() -> String {
    format!(
        "ORD-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        random_suffix(SUFFIX_LENGTH)
    )
}

/// The deterministic document id for an order, derived from its checkout
/// session id.
#[must_use]
pub fn order_document_id(session_id: &CheckoutSessionId) -> String {
    format!("order-{session_id}")
}

fn random_suffix(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..len
            char::from(*SUFFIX_CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Build the order document for a completed checkout session.
///
/// Totals come from the session's authoritative amounts in minor currency
/// units; the metadata lines only say what was purchased and how many.
#[must_use]
pub fn build_order_document(
    session: &CheckoutSession,
    metadata: &CheckoutMetadata,
    order_number: String,
) -> OrderDocument {
    let currency = session
        .currency
        .as_deref()
        .and_then(Currency::parse)
        .unwrap_or_default();

    let total = Price::from_minor_units(session.amount_total.unwrap_or(0), currency);
    let discount = Price::from_minor_units(
        session
            .total_details
            .as_ref()
            .and_then(|t| t.amount_discount)
            .unwrap_or(0),
        currency,
    );

    let customer_name = session
        .customer_details
        .as_ref()
        .and_then(|d| d.name.clone())
        .unwrap_or_else(|| "Guest".to_string());

    let products = metadata
        .lines
        .iter()
        .map(|line| OrderProductEntry {
            key: format!("{}-{}", line.id, random_suffix(5)),
            product: Reference::to_document(line.id.as_str()),
            quantity: line.quantity,
        })
        .collect();

    OrderDocument {
        id: order_document_id(&session.id),
        kind: "order".to_string(),
        order_number,
        stripe_checkout_session_id: session.id.to_string(),
        stripe_customer_id: session.customer.clone().unwrap_or_default(),
        clerk_user_id: session.client_reference_id.clone().unwrap_or_default(),
        customer_name: customer_name.clone(),
        email: session
            .customer_details
            .as_ref()
            .and_then(|d| d.email.clone())
            .unwrap_or_default(),
        stripe_payment_intent_id: session
            .payment_intent
            .clone()
            .map(stride_core::PaymentIntentId::into_inner)
            .unwrap_or_default(),
        products,
        total_price: total.amount.to_f64().unwrap_or(0.0),
        currency: currency.code().to_string(),
        amount_discount: discount.amount.to_f64().unwrap_or(0.0),
        address: shipping_address(session, &customer_name),
        status: OrderStatus::Paid.to_string(),
        order_date: chrono::Utc::now().to_rfc3339(),
    }
}

/// Derive the shipping address from a session, if one was collected.
///
/// The address name falls back to the customer name, matching how the
/// hosted checkout labels shipping details.
#[must_use]
pub fn shipping_address(session: &CheckoutSession, customer_name: &str) -> Option<OrderAddress> {
    let details = session.shipping_details.as_ref()?;
    let address = details.address.as_ref()?;

    Some(OrderAddress {
        name: details
            .name
            .clone()
            .or_else(|| Some(customer_name.to_string())),
        address: address.line1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.postal_code.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::Event;

    fn completed_session(json: serde_json::Value) -> CheckoutSession {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": json }
        }))
        .expect("event");
        event.checkout_session().expect("session")
    }

    fn full_session() -> CheckoutSession {
        completed_session(serde_json::json!({
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
            "metadata": { "products": "[{\"_id\":\"p1\",\"quantity\":2}]" }
        }))
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("ORD"));
        assert!(parts.next().expect("timestamp").parse::<i64>().is_ok());
        let suffix = parts.next().expect("suffix");
        assert_eq!(suffix.len(), SUFFIX_LENGTH);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_order_document_totals_in_major_units() {
        let session = full_session();
        let metadata = CheckoutMetadata::parse(&session.metadata).expect("metadata");
        let doc = build_order_document(&session, &metadata, "ORD-1-TEST".to_string());

        // 4000 cents, usd -> 40.00 USD
        assert!((doc.total_price - 40.0).abs() < f64::EPSILON);
        assert!((doc.amount_discount - 5.0).abs() < f64::EPSILON);
        assert_eq!(doc.currency, "USD");
        assert_eq!(doc.status, "paid");

        assert_eq!(doc.products.len(), 1);
        assert_eq!(doc.products[0].quantity, 2);
        assert_eq!(doc.products[0].product.reference, "p1");
    }

    #[test]
    fn test_order_document_id_is_deterministic() {
        let session = full_session();
        let metadata = CheckoutMetadata::parse(&session.metadata).expect("metadata");

        let first = build_order_document(&session, &metadata, generate_order_number());
        let second = build_order_document(&session, &metadata, generate_order_number());

        // Same session -> same document id, so createIfNotExists dedupes
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, "order-cs_test_1");
    }

    #[test]
    fn test_shipping_address_derivation() {
        let session = full_session();
        let address = shipping_address(&session, "Jess").expect("address");

        assert_eq!(address.address.as_deref(), Some("1 Main St"));
        assert_eq!(address.city.as_deref(), Some("Denver"));
        assert_eq!(address.zip.as_deref(), Some("80202"));
    }

    #[test]
    fn test_missing_shipping_details_yields_no_address() {
        let session = completed_session(serde_json::json!({
            "id": "cs_test_2",
            "metadata": { "products": "[{\"id\":\"p1\",\"quantity\":1}]" }
        }));
        assert!(shipping_address(&session, "Guest").is_none());
    }

    #[test]
    fn test_sparse_session_defaults() {
        let session = completed_session(serde_json::json!({
            "id": "cs_test_3",
            "metadata": { "products": "[{\"id\":\"p1\",\"quantity\":1}]" }
        }));
        let metadata = CheckoutMetadata::parse(&session.metadata).expect("metadata");
        let doc = build_order_document(&session, &metadata, "ORD-1-TEST".to_string());

        assert_eq!(doc.customer_name, "Guest");
        assert_eq!(doc.currency, "USD");
        assert!((doc.total_price - 0.0).abs() < f64::EPSILON);
        assert!(doc.address.is_none());
    }
}
