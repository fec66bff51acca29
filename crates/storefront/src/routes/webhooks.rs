//! Stripe webhook receiver.
//!
//! Single-shot, stateless per event: verify the signature against the raw
//! body, branch on the event type, and on `checkout.session.completed`
//! record the order. Order creation is the only step whose failure surfaces
//! as an error response; address caching is best-effort and never fails the
//! webhook.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::checkout::CheckoutMetadata;
use crate::orders;
use crate::sanity::types::AddressDocument;
use crate::state::AppState;
use crate::stripe::{Event, webhook};

/// Header carrying the Stripe signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle an inbound Stripe webhook event.
///
/// # Route
///
/// `POST /webhooks/stripe`
///
/// The raw body bytes MUST reach this handler unparsed - signature
/// verification runs over exactly what Stripe signed.
#[instrument(skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // (1) Signature header must be present
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook rejected: missing stripe-signature header");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing stripe-signature header".to_string(),
        );
    };

    // (2) Verify against the raw bytes, then parse
    let event = match webhook::construct_event(
        &body,
        signature,
        &state.config().stripe.webhook_secret,
    ) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Webhook signature verification failed: {e}");
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Webhook signature verification failed: {e}"),
            );
        }
    };

    // (3) Dispatch on event kind
    match event.kind.as_str() {
        "checkout.session.completed" => match handle_checkout_completed(&state, &event).await {
            Ok(()) => {}
            Err(WebhookError::BadPayload(message)) => {
                tracing::error!("Webhook rejected: {message}");
                return error_response(StatusCode::BAD_REQUEST, message);
            }
            Err(WebhookError::OrderCreation(e)) => {
                tracing::error!("Order creation failed: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Internal server error",
                        "details": "order creation failed",
                    })),
                )
                    .into_response();
            }
        },
        "payment_intent.succeeded" => {
            tracing::info!(
                payment_intent = event.object_id().unwrap_or("unknown"),
                "Payment succeeded"
            );
        }
        "payment_intent.payment_failed" => {
            tracing::error!(
                payment_intent = event.object_id().unwrap_or("unknown"),
                "Payment failed"
            );
        }
        other => {
            tracing::debug!(kind = other, "Unhandled event type");
        }
    }

    // (6) Acknowledge once the event has been dispatched
    (StatusCode::OK, Json(serde_json::json!({ "received": true }))).into_response()
}

/// Failure modes of the checkout-completed branch.
enum WebhookError {
    /// The verified payload failed schema validation - rejected, no order.
    BadPayload(String),
    /// The order write to the content backend failed.
    OrderCreation(crate::sanity::ContentError),
}

/// (4) Record the order for a completed checkout session.
async fn handle_checkout_completed(state: &AppState, event: &Event) -> Result<(), WebhookError> {
    let session = event
        .checkout_session()
        .map_err(|e| WebhookError::BadPayload(format!("Malformed checkout session: {e}")))?;

    // The metadata payload is the only record of what was purchased;
    // malformed metadata is rejected, never trusted
    let metadata = CheckoutMetadata::parse(&session.metadata)
        .map_err(|e| WebhookError::BadPayload(format!("Invalid checkout metadata: {e}")))?;

    let order_number = orders::generate_order_number();
    let order = orders::build_order_document(&session, &metadata, order_number);

    let created = state
        .content()
        .create_order_if_not_exists(&order)
        .await
        .map_err(WebhookError::OrderCreation)?;

    if created {
        tracing::info!(
            order_number = %order.order_number,
            session_id = %session.id,
            "Order created"
        );
    } else {
        tracing::info!(
            session_id = %session.id,
            "Order already recorded for this session, skipping (redelivered event)"
        );
        return Ok(());
    }

    // (5) Best-effort address cache - failures are logged and swallowed.
    // Stripe already validated the email, but it keys the cache lookup, so
    // an unparseable value skips the step instead of polluting the cache.
    if let Some(address) = &order.address
        && let Ok(email) = stride_core::Email::parse(&order.email)
    {
        if let Err(e) = cache_address(state, &email, &order.customer_name, address).await {
            tracing::warn!("Error saving address (non-critical): {e}");
        }
    }

    Ok(())
}

/// (5) Persist the shipping address unless an equivalent one is already
/// cached for this email. The first address for an email becomes the
/// default.
async fn cache_address(
    state: &AppState,
    email: &stride_core::Email,
    customer_name: &str,
    address: &crate::sanity::types::OrderAddress,
) -> Result<(), crate::sanity::ContentError> {
    let existing = state.content().get_addresses_by_email(email.as_str()).await?;

    if existing.iter().any(|cached| cached.matches(address)) {
        return Ok(());
    }

    let document = AddressDocument {
        id: None,
        kind: "address".to_string(),
        name: address
            .name
            .clone()
            .unwrap_or_else(|| customer_name.to_string()),
        email: email.to_string(),
        address: address.address.clone().unwrap_or_default(),
        city: address.city.clone().unwrap_or_default(),
        state: address.state.clone().unwrap_or_default(),
        zip: address.zip.clone().unwrap_or_default(),
        default: existing.is_empty(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.content().create_address(&document).await?;
    tracing::info!(email = %email, "Address saved");

    Ok(())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
