//! Category ("sports") route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

use super::products::ProductCardView;

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/category.html")]
pub struct CategoryTemplate {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub products: Vec<ProductCardView>,
}

/// Display a category landing page with its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let category = state.content().get_category_by_slug(&slug).await?;

    let products = state
        .content()
        .get_products_by_category(&slug)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch products for category {slug}: {e}");
            Vec::new()
        });

    Ok(CategoryTemplate {
        title: category.title,
        description: category.description.unwrap_or_default(),
        image_url: category.image.unwrap_or_default(),
        products: products.iter().map(ProductCardView::from).collect(),
    })
}
