//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clerk::IdentityClient;
use crate::config::StorefrontConfig;
use crate::sanity::ContentClient;
use crate::search::SearchIndex;
use crate::stripe::CheckoutClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, external clients, and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    content: ContentClient,
    payments: CheckoutClient,
    identity: IdentityClient,
    search: SearchIndex,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let content = ContentClient::new(&config.sanity);
        let payments = CheckoutClient::new(&config.stripe);
        let identity = IdentityClient::new(&config.clerk);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                payments,
                identity,
                search: SearchIndex::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Sanity content client.
    #[must_use]
    pub fn content(&self) -> &ContentClient {
        &self.inner.content
    }

    /// Get a reference to the Stripe checkout client.
    #[must_use]
    pub fn payments(&self) -> &CheckoutClient {
        &self.inner.payments
    }

    /// Get a reference to the Clerk identity client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the product search index.
    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.inner.search
    }

    /// Start building the search index in a background task.
    pub fn start_search_indexing(&self) {
        crate::search::build_index_async(self.inner.search.clone(), self.inner.content.clone());
    }
}
