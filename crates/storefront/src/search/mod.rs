//! Full-text product search using Tantivy.
//!
//! This module provides a search index built asynchronously at startup from
//! the Sanity product catalog. Queries match against product name, brand
//! title, and category, ordered by relevance and capped at
//! [`RESULT_LIMIT`] results.
//!
//! The app starts immediately with an empty index. A background task builds
//! the real index and swaps it in atomically when ready.

mod indexer;

use std::sync::{Arc, RwLock};

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::{Index, IndexReader, ReloadPolicy, Term};
use tracing::instrument;

pub use indexer::build_index_async;

/// Maximum number of results a search returns.
pub const RESULT_LIMIT: usize = 50;

/// A search result item.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub slug: String,
    pub name: String,
    pub brand_title: Option<String>,
    pub category: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
    pub score: f32,
}

/// Schema field handles for the search index.
#[derive(Clone)]
pub struct SearchFields {
    // Stored fields (returned in results)
    pub slug: Field,
    pub name: Field,
    pub brand: Field,
    pub category: Field,
    pub price: Field,
    pub image_url: Field,
    // Text fields for full-text search (not stored, just indexed)
    pub name_text: Field,
    pub brand_text: Field,
    pub category_text: Field,
}

/// Inner index state (once built).
struct ReadyIndex {
    #[allow(dead_code)]
    index: Index,
    reader: IndexReader,
    fields: SearchFields,
}

/// The search index.
///
/// Starts empty and is populated asynchronously by a background task.
#[derive(Clone)]
pub struct SearchIndex {
    inner: Arc<RwLock<Option<ReadyIndex>>>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    /// Create a new empty search index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if the index is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Set the built index. Called by the background builder task.
    pub(crate) fn set_ready(&self, index: Index, fields: SearchFields) -> Result<(), SearchError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        let ready = ReadyIndex {
            index,
            reader,
            fields,
        };

        *self
            .inner
            .write()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))? = Some(ready);

        Ok(())
    }

    /// Build the schema for the search index.
    pub(crate) fn build_schema() -> (Schema, SearchFields) {
        let mut schema_builder = Schema::builder();

        // Stored fields returned with results
        let slug = schema_builder.add_text_field("slug", STORED);
        let name = schema_builder.add_text_field("name", STORED);
        let brand = schema_builder.add_text_field("brand", STORED);
        let category = schema_builder.add_text_field("category", STORED);
        let price = schema_builder.add_text_field("price", STORED);
        let image_url = schema_builder.add_text_field("image_url", STORED);

        // Text indexing options for full-text search. Tokens are lowercased
        // but not stemmed: query terms are matched raw, so stemming would
        // make "hiking" miss the indexed token.
        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer("en_lower")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        // Indexed text fields (for searching)
        let name_text = schema_builder.add_text_field("name_text", text_options.clone());
        let brand_text = schema_builder.add_text_field("brand_text", text_options.clone());
        let category_text = schema_builder.add_text_field("category_text", text_options);

        let schema = schema_builder.build();
        let fields = SearchFields {
            slug,
            name,
            brand,
            category,
            price,
            image_url,
            name_text,
            brand_text,
            category_text,
        };

        (schema, fields)
    }

    /// Search the index with the given query string.
    ///
    /// Returns empty results if the index isn't ready yet. Results are
    /// relevance-ordered and capped at `limit` (itself capped at
    /// [`RESULT_LIMIT`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned or the search query fails.
    #[instrument(skip(self))]
    // Allow: The RwLockReadGuard must be held for the entire search operation because
    // `ready` is a reference that borrows from the guard's protected data. Dropping
    // the guard early would release the read lock and invalidate the `ready` reference.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search(&self, query_str: &str, limit: usize) -> Result<SearchResults, SearchError> {
        let query_str = query_str.trim().to_lowercase();
        let limit = limit.min(RESULT_LIMIT);
        if query_str.is_empty() {
            return Ok(SearchResults::default());
        }

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        let Some(ready) = guard.as_ref() else {
            // Index not ready yet, return empty results
            return Ok(SearchResults {
                query: query_str,
                ..Default::default()
            });
        };

        let searcher = ready.reader.searcher();

        // Build a boolean query combining prefix and fuzzy matches across
        // name, brand title, and category
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for term in query_str.split_whitespace() {
            if term.len() < 3 {
                // Short terms: prefix match via regex (e.g., "ru" matches "running")
                let prefix_pattern = format!("{}.*", escape_regex(term));
                for field in [
                    ready.fields.name_text,
                    ready.fields.brand_text,
                    ready.fields.category_text,
                ] {
                    if let Ok(regex_query) = RegexQuery::from_pattern(&prefix_pattern, field) {
                        subqueries.push((Occur::Should, Box::new(regex_query)));
                    }
                }
            } else {
                // Name exact + fuzzy match (1 edit distance)
                let name_term = Term::from_field_text(ready.fields.name_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(name_term.clone(), IndexRecordOption::Basic)),
                ));
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(name_term, 1, true)),
                ));

                // Brand exact + fuzzy match
                let brand_term = Term::from_field_text(ready.fields.brand_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(brand_term.clone(), IndexRecordOption::Basic)),
                ));
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(brand_term, 1, true)),
                ));

                // Category exact match
                let category_term = Term::from_field_text(ready.fields.category_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(category_term, IndexRecordOption::Basic)),
                ));
            }
        }

        let query = BooleanQuery::new(subqueries);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;

        let mut products = Vec::new();
        for (score, doc_address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            products.push(Self::doc_to_result(&ready.fields, &doc, score));
        }

        Ok(SearchResults {
            products,
            query: query_str,
        })
    }

    /// Convert a Tantivy document to a search result.
    fn doc_to_result(
        fields: &SearchFields,
        doc: &tantivy::TantivyDocument,
        score: f32,
    ) -> SearchResult {
        let get_text = |field: Field| -> String {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        SearchResult {
            slug: get_text(fields.slug),
            name: get_text(fields.name),
            brand_title: non_empty(get_text(fields.brand)),
            category: non_empty(get_text(fields.category)),
            price: get_text(fields.price),
            image_url: non_empty(get_text(fields.image_url)),
            score,
        }
    }

    /// Get the number of documents in the index, or 0 if not ready.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|r| r.reader.searcher().num_docs()))
            .unwrap_or(0)
    }
}

/// Escape basic regex metacharacters for safe prefix patterns.
fn escape_regex(term: &str) -> String {
    term.chars()
        .flat_map(|c| match c {
            '.' | '*' | '+' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
            | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

/// Search results for a query.
#[derive(Debug, Default)]
pub struct SearchResults {
    pub products: Vec<SearchResult>,
    pub query: String,
}

impl SearchResults {
    /// Check if there are any results.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Get the total number of results.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.products.len()
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Build error: {0}")]
    Build(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanity::types::Product;

    fn sample_products() -> Vec<Product> {
        serde_json::from_value(serde_json::json!([
            {
                "_id": "p1",
                "name": "Trail Runner GTX",
                "slug": "trail-runner-gtx",
                "price": 129.99,
                "variant": "running",
                "images": ["https://cdn.sanity.io/shoe.jpg"],
                "brand": { "title": "Vortex" }
            },
            {
                "_id": "p2",
                "name": "Court Pro Racket",
                "slug": "court-pro-racket",
                "price": 89.0,
                "variant": "tennis",
                "brand": { "title": "Vortex" }
            },
            {
                "_id": "p3",
                "name": "Summit Pack 30L",
                "slug": "summit-pack-30l",
                "price": 74.5,
                "variant": "hiking",
                "brand": { "title": "Alta" }
            }
        ]))
        .expect("sample products")
    }

    fn ready_index() -> SearchIndex {
        let index = SearchIndex::new();
        let (built, fields) = indexer::build_in_ram(&sample_products()).expect("build");
        index.set_ready(built, fields).expect("set ready");
        index
    }

    #[test]
    fn test_empty_index_returns_no_results() {
        let index = SearchIndex::new();
        assert!(!index.is_ready());

        let results = index.search("racket", 10).expect("search");
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_by_name() {
        let index = ready_index();
        let results = index.search("racket", 10).expect("search");

        assert_eq!(results.total(), 1);
        assert_eq!(results.products[0].slug, "court-pro-racket");
    }

    #[test]
    fn test_search_by_brand_matches_all_brand_products() {
        let index = ready_index();
        let results = index.search("vortex", 10).expect("search");

        assert_eq!(results.total(), 2);
        let slugs: Vec<_> = results.products.iter().map(|r| r.slug.as_str()).collect();
        assert!(slugs.contains(&"trail-runner-gtx"));
        assert!(slugs.contains(&"court-pro-racket"));
    }

    #[test]
    fn test_search_by_category() {
        let index = ready_index();
        let results = index.search("hiking", 10).expect("search");

        assert_eq!(results.total(), 1);
        assert_eq!(results.products[0].name, "Summit Pack 30L");
    }

    #[test]
    fn test_short_term_prefix_match() {
        let index = ready_index();
        let results = index.search("su", 10).expect("search");

        assert!(results.products.iter().any(|r| r.slug == "summit-pack-30l"));
    }

    #[test]
    fn test_results_capped() {
        let index = ready_index();
        let results = index.search("vortex", 1).expect("search");
        assert_eq!(results.total(), 1);
    }

    #[test]
    fn test_limit_never_exceeds_global_cap() {
        let index = ready_index();
        // Asking for more than RESULT_LIMIT is clamped, not honored
        let results = index.search("vortex", RESULT_LIMIT * 10).expect("search");
        assert!(results.total() <= RESULT_LIMIT);
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b"), "a\\.b");
        assert_eq!(escape_regex("plain"), "plain");
    }
}
