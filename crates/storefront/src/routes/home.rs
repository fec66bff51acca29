//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::sanity::types::{Brand, Category};
use crate::state::AppState;

use super::products::ProductCardView;

/// Brand display data for the featured-brands rail.
#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub image_url: String,
}

impl From<&Brand> for BrandView {
    fn from(brand: &Brand) -> Self {
        Self {
            title: brand.title.clone(),
            image_url: brand.image.clone().unwrap_or_default(),
        }
    }
}

/// Category display data for the category grid.
#[derive(Clone)]
pub struct CategoryView {
    pub slug: String,
    pub title: String,
    pub range: String,
    pub image_url: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            slug: category.slug.clone().unwrap_or_default(),
            title: category.title.clone(),
            range: category.range.clone().unwrap_or_default(),
            image_url: category.image.clone().unwrap_or_default(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub new_arrivals: Vec<ProductCardView>,
    pub brands: Vec<BrandView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
///
/// Each section degrades independently: a failed content fetch renders an
/// empty rail rather than failing the whole page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let (new_arrivals, brands, categories) = tokio::join!(
        state.content().get_new_arrivals(),
        state.content().get_brands(),
        state.content().get_categories(),
    );

    let new_arrivals = new_arrivals.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch new arrivals: {e}");
        Vec::new()
    });
    let brands = brands.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch brands: {e}");
        Vec::new()
    });
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch categories: {e}");
        Vec::new()
    });

    HomeTemplate {
        new_arrivals: new_arrivals.iter().map(ProductCardView::from).collect(),
        brands: brands.iter().map(BrandView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
    }
}
