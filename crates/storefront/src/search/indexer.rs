//! Search index builder.
//!
//! Builds the search index asynchronously from the Sanity product catalog.

use tantivy::Index;
use tracing::{error, info, instrument, warn};

use crate::sanity::ContentClient;
use crate::sanity::types::Product;

use super::{SearchFields, SearchIndex};

/// Spawn a background task to build the search index.
///
/// The index will be populated asynchronously. Until complete,
/// `SearchIndex::search()` returns empty results.
pub fn build_index_async(search_index: SearchIndex, content: ContentClient) {
    info!("Spawning background search index build task");
    tokio::spawn(async move {
        match build_index(&content).await {
            Ok((index, fields)) => {
                if let Err(e) = search_index.set_ready(index, fields) {
                    error!(error = %e, "Failed to set search index as ready");
                } else {
                    let docs = search_index.num_docs();
                    info!(docs, "Search index is now ready and serving requests");
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to build search index");
            }
        }
    });
}

/// Build the search index (called by background task).
#[instrument(skip_all)]
async fn build_index(content: &ContentClient) -> Result<(Index, SearchFields), super::SearchError> {
    let products = content.get_products().await.map_err(|e| {
        super::SearchError::Build(format!("Failed to fetch products for indexing: {e}"))
    })?;

    info!(count = products.len(), "Indexing products");
    build_in_ram(&products)
}

/// Build an in-RAM index over a product list.
pub(crate) fn build_in_ram(
    products: &[Product],
) -> Result<(Index, SearchFields), super::SearchError> {
    let (schema, fields) = SearchIndex::build_schema();

    let index = Index::create_in_ram(schema);

    // Register the lowercasing tokenizer used by the schema's text fields
    let tokenizer_manager = index.tokenizers();
    tokenizer_manager.register(
        "en_lower",
        tantivy::tokenizer::TextAnalyzer::builder(tantivy::tokenizer::SimpleTokenizer::default())
            .filter(tantivy::tokenizer::RemoveLongFilter::limit(40))
            .filter(tantivy::tokenizer::LowerCaser)
            .build(),
    );

    let mut writer = index
        .writer(50_000_000) // 50MB buffer
        .map_err(|e| super::SearchError::Build(format!("Failed to create writer: {e}")))?;

    for product in products {
        let brand_title = product
            .brand
            .as_ref()
            .map(|b| b.title.clone())
            .unwrap_or_default();
        let category = product.variant.clone().unwrap_or_default();

        let doc = tantivy::doc!(
            fields.slug => product.slug.clone().unwrap_or_default(),
            fields.name => product.name.clone(),
            fields.brand => brand_title.clone(),
            fields.category => category.clone(),
            fields.price => format!("${:.2}", product.price),
            fields.image_url => product.primary_image().unwrap_or_default().to_string(),
            fields.name_text => product.name.clone(),
            fields.brand_text => brand_title,
            fields.category_text => category
        );

        if let Err(e) = writer.add_document(doc) {
            warn!(error = %e, product = %product.id, "Failed to index product");
        }
    }

    writer
        .commit()
        .map_err(|e| super::SearchError::Build(format!("Failed to commit index: {e}")))?;

    Ok((index, fields))
}
