//! Wishlist route handlers.
//!
//! The wishlist is a bare set of product ids persisted in the session under
//! a key namespaced by the signed-in Clerk user id - two customers sharing
//! a browser never see each other's wishlist.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use stride_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::state::AppState;

use super::products::ProductCardView;

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/wishlist.html")]
pub struct WishlistTemplate {
    pub products: Vec<ProductCardView>,
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
    /// Where to land after toggling (defaults to the wishlist page).
    pub redirect: Option<String>,
}

/// Display the wishlist page.
///
/// Requires sign-in; the stored ids are resolved against the catalog so
/// deleted products silently drop out.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<impl IntoResponse> {
    let ids: Vec<ProductId> = session
        .get(&session_keys::wishlist(&customer.id))
        .await?
        .unwrap_or_default();

    let products = state.content().get_products_by_ids(&ids).await?;

    Ok(WishlistTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
    })
}

/// Toggle a product in the wishlist.
///
/// # Route
///
/// `POST /wishlist/toggle`
#[instrument(skip(session, customer))]
pub async fn toggle(
    session: Session,
    RequireAuth(customer): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    let key = session_keys::wishlist(&customer.id);
    let mut ids: Vec<ProductId> = session.get(&key).await?.unwrap_or_default();

    let product_id = ProductId::new(form.product_id);
    if ids.contains(&product_id) {
        ids.retain(|id| id != &product_id);
    } else {
        ids.push(product_id);
    }

    session.insert(&key, &ids).await?;

    let target = form.redirect.unwrap_or_else(|| "/wishlist".to_string());
    Ok(Redirect::to(&target).into_response())
}
