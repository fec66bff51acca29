//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::search::{RESULT_LIMIT, SearchResult};
use crate::state::AppState;

/// Search page query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search result display data.
#[derive(Clone)]
pub struct SearchResultView {
    pub slug: String,
    pub name: String,
    pub brand_title: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
}

impl From<&SearchResult> for SearchResultView {
    fn from(result: &SearchResult) -> Self {
        Self {
            slug: result.slug.clone(),
            name: result.name.clone(),
            brand_title: result.brand_title.clone().unwrap_or_default(),
            category: result.category.clone().unwrap_or_default(),
            price: result.price.clone(),
            image_url: result.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub query: String,
    pub results: Vec<SearchResultView>,
    pub is_ready: bool,
}

/// Display the search page.
///
/// Matches product name, brand title, and category; relevance-ordered and
/// capped at 50 results. While the index is still building, the page says
/// so instead of showing a false "no results".
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let query_str = query.q.trim();

    let results = state
        .search()
        .search(query_str, RESULT_LIMIT)
        .unwrap_or_default();

    SearchTemplate {
        query: query.q.clone(),
        results: results.products.iter().map(SearchResultView::from).collect(),
        is_ready: state.search().is_ready(),
    }
}
