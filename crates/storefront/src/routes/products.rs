//! Product route handlers: shop listing and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use stride_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::sanity::types::Product as SanityProduct;
use crate::state::AppState;

/// Product card display data for grids.
///
/// Optional catalog fields are flattened to empty strings for the
/// templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub brand_title: String,
    pub price: String,
    /// Strikethrough price when a discount applies.
    pub original_price: String,
    /// Merchandising badge ("new", "hot", "sale").
    pub status: String,
    pub image_url: String,
    pub in_stock: bool,
}

impl From<&SanityProduct> for ProductCardView {
    fn from(product: &SanityProduct) -> Self {
        Self {
            slug: product.slug.clone().unwrap_or_default(),
            name: product.name.clone(),
            brand_title: product
                .brand
                .as_ref()
                .map(|b| b.title.clone())
                .unwrap_or_default(),
            price: format!("${:.2}", product.price),
            original_price: product
                .original_price()
                .map(|p| format!("${p:.2}"))
                .unwrap_or_default(),
            status: product.status.clone().unwrap_or_default(),
            image_url: product.primary_image().unwrap_or_default().to_string(),
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub brand_title: String,
    pub price: String,
    pub original_price: String,
    pub description: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub wishlisted: bool,
}

/// Shop listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/shop.html")]
pub struct ShopTemplate {
    pub products: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/product.html")]
pub struct ProductTemplate {
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
    pub signed_in: bool,
}

/// Display the shop listing page (all products, newest first).
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = state.content().get_products().await?;

    Ok(ShopTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
    })
}

/// Display a product detail page with related products.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state.content().get_product_by_slug(&slug).await?;

    // Related products share the category; failures degrade to an empty rail
    let related = match &product.variant {
        Some(variant) => state
            .content()
            .get_related_products(variant, &product.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to fetch related products: {e}");
                Vec::new()
            }),
        None => Vec::new(),
    };

    // Wishlist state only exists for signed-in customers
    let wishlisted = match &auth {
        Some(customer) => session
            .get::<Vec<ProductId>>(&session_keys::wishlist(&customer.id))
            .await
            .ok()
            .flatten()
            .is_some_and(|ids| ids.contains(&product.id)),
        None => false,
    };

    Ok(ProductTemplate {
        product: ProductDetailView {
            id: product.id.to_string(),
            slug: product.slug.clone().unwrap_or_default(),
            name: product.name.clone(),
            brand_title: product
                .brand
                .as_ref()
                .map(|b| b.title.clone())
                .unwrap_or_default(),
            price: format!("${:.2}", product.price),
            original_price: product
                .original_price()
                .map(|p| format!("${p:.2}"))
                .unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            images: product.images.clone(),
            in_stock: product.in_stock(),
            wishlisted,
        },
        related: related.iter().map(ProductCardView::from).collect(),
        signed_in: auth.is_some(),
    })
}
