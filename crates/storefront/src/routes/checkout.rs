//! Checkout session initiation.
//!
//! `POST /api/checkout/session` takes the submitted cart lines, re-validates
//! them against the content backend, and asks Stripe for a hosted checkout
//! session. Prices are always re-derived from the authoritative Sanity
//! records - a client-submitted price is accepted in the payload for shape
//! compatibility but never used.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use stride_core::ProductId;

use crate::cart::SessionCart;
use crate::checkout::{CheckoutMetadata, MetadataLine};
use crate::error::{ApiError, AppError};
use crate::filters;
use crate::middleware::RequireApiAuth;
use crate::models::CurrentCustomer;
use crate::state::AppState;
use crate::stripe::{CreateCheckoutSession, LineItem};

/// A cart line as submitted by the client.
///
/// Only the product id and quantity are read. Submitted display data
/// (name, unit price, images) is ignored - serde drops the extra keys and
/// the server re-derives everything from the authoritative records.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedLine {
    #[serde(alias = "_id")]
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request body for checkout initiation.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub products: Vec<SubmittedLine>,
}

/// Response body: the hosted checkout redirect URL.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a hosted checkout session for the submitted cart lines.
///
/// # Route
///
/// `POST /api/checkout/session`
#[instrument(skip(state, customer, request))]
pub async fn create_session(
    State(state): State<AppState>,
    RequireApiAuth(customer): RequireApiAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    // Collapse duplicate ids up front so the validation count compares
    // distinct products, not submitted lines
    let mut quantities: HashMap<ProductId, u32> = HashMap::new();
    let mut order: Vec<ProductId> = Vec::new();
    for line in &request.products {
        let entry = quantities.entry(line.product_id.clone()).or_insert(0);
        if *entry == 0 {
            order.push(line.product_id.clone());
        }
        *entry = entry.saturating_add(line.quantity.max(1));
    }

    let lines: Vec<(ProductId, u32)> = order
        .into_iter()
        .map(|id| {
            let quantity = quantities.get(&id).copied().unwrap_or(1);
            (id, quantity)
        })
        .collect();

    let url = initiate(&state, &customer, &lines).await?;

    Ok(Json(CheckoutResponse { url }))
}

/// Validate cart lines and create the hosted session.
///
/// Shared by the JSON endpoint and the cart page's form post.
///
/// # Errors
///
/// Returns `BadRequest` for an empty cart or unknown products, and
/// propagates content/payment failures.
pub(crate) async fn initiate(
    state: &AppState,
    customer: &CurrentCustomer,
    lines: &[(ProductId, u32)],
) -> Result<String, AppError> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    // Fetch the authoritative records for every submitted id
    let ids: Vec<ProductId> = lines.iter().map(|(id, _)| id.clone()).collect();
    let authoritative = state.content().get_checkout_products(&ids).await?;

    // A count mismatch means at least one product no longer exists
    if authoritative.len() != ids.len() {
        return Err(AppError::BadRequest(
            "One or more products not found".to_string(),
        ));
    }

    let by_id: HashMap<&str, &crate::sanity::types::CheckoutProduct> = authoritative
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();

    let placeholder_image = format!(
        "{}/static/images/placeholder-product.png",
        state.config().base_url
    );

    let mut line_items = Vec::with_capacity(lines.len());
    let mut metadata_lines = Vec::with_capacity(lines.len());

    for (id, quantity) in lines {
        let product = by_id.get(id.as_str()).ok_or_else(|| {
            AppError::BadRequest("One or more products not found".to_string())
        })?;

        // Stripe wants minor units; the catalog stores major units
        #[allow(clippy::cast_possible_truncation)]
        let unit_amount = (product.price * 100.0).round() as i64;

        line_items.push(LineItem {
            name: product.name.clone(),
            image_url: Some(
                product
                    .images
                    .first()
                    .cloned()
                    .unwrap_or_else(|| placeholder_image.clone()),
            ),
            unit_amount,
            currency: "usd".to_string(),
            quantity: *quantity,
        });

        metadata_lines.push(MetadataLine {
            id: id.clone(),
            quantity: *quantity,
        });
    }

    let metadata = CheckoutMetadata::new(metadata_lines)
        .to_entries()
        .map_err(|e| AppError::Internal(format!("Failed to encode checkout metadata: {e}")))?;

    let base_url = &state.config().base_url;
    let params = CreateCheckoutSession {
        line_items,
        success_url: format!("{base_url}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base_url}/cart"),
        client_reference_id: customer.id.to_string(),
        customer_email: customer.email.clone(),
        metadata,
    };

    let session = state.payments().create_checkout_session(&params).await?;

    session.url.ok_or(AppError::Payment(
        crate::stripe::StripeError::MissingRedirectUrl,
    ))
}

/// Checkout success page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/success.html")]
pub struct SuccessTemplate {
    pub session_id: String,
}

/// Query parameters on the success redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Display the checkout success page.
///
/// This is the first point the storefront regains control after the Stripe
/// redirect, so the session cart is cleared here.
#[instrument(skip(session))]
pub async fn success(
    session: Session,
    axum::extract::Query(query): axum::extract::Query<SuccessQuery>,
) -> Result<impl IntoResponse, AppError> {
    SessionCart::clear(&session).await?;

    Ok(SuccessTemplate {
        session_id: query.session_id.unwrap_or_default(),
    })
}
