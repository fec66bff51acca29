//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Cart lines live in the session; every mutation goes through the
//! [`SessionCart`] adapter so the persisted state always matches what the
//! customer sees.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use stride_core::ProductId;

use crate::cart::{Cart, CartLine, SessionCart};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub brand_title: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: format!("${:.2}", cart.total()),
            item_count: cart.count(),
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            brand_title: line.brand_title.clone().unwrap_or_default(),
            quantity: line.quantity,
            price: format!("${:.2}", line.unit_price),
            line_price: format!("${:.2}", line.subtotal()),
            image_url: line.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<impl IntoResponse> {
    let cart = SessionCart::load(&session).await?;

    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
    })
}

/// Add item to cart (HTMX).
///
/// Looks up the product by slug so the line carries the authoritative name,
/// price, and image at add time. Returns an HTMX trigger to update the cart
/// count badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state.content().get_product_by_slug(&form.slug).await?;

    if !product.in_stock() {
        return Err(AppError::BadRequest("This product is out of stock".to_string()));
    }

    let line = CartLine {
        product_id: product.id.clone(),
        name: product.name.clone(),
        unit_price: Decimal::from_f64_retain(product.price).unwrap_or_default(),
        quantity: form.quantity.unwrap_or(1).max(1),
        image_url: product.primary_image().map(String::from),
        brand_title: product.brand.as_ref().map(|b| b.title.clone()),
    };

    let mut cart = SessionCart::load(&session).await?;
    cart.add(line);
    SessionCart::save(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count: cart.count() },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
///
/// A quantity below 1 removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = SessionCart::load(&session).await?;
    cart.update_quantity(&ProductId::new(form.product_id), form.quantity);
    SessionCart::save(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = SessionCart::load(&session).await?;
    cart.remove(&ProductId::new(form.product_id));
    SessionCart::save(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = SessionCart::load(&session).await?;
    Ok(CartCountTemplate { count: cart.count() })
}

/// Begin checkout from the cart page (form post).
///
/// Requires a signed-in customer and a non-empty cart; on success responds
/// with a redirect to the Stripe-hosted checkout page.
#[instrument(skip(state, session, customer))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Response> {
    let cart = SessionCart::load(&session).await?;

    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let lines: Vec<(ProductId, u32)> = cart
        .lines()
        .iter()
        .map(|l| (l.product_id.clone(), l.quantity))
        .collect();

    match super::checkout::initiate(&state, &customer, &lines).await {
        Ok(url) => Ok(Redirect::to(&url).into_response()),
        Err(e) => {
            tracing::error!("Checkout initiation failed: {e}");
            Ok(Redirect::to("/cart?error=checkout").into_response())
        }
    }
}
