//! Sanity HTTP API client implementation.
//!
//! Read queries go through the CDN host (`apicdn.sanity.io`) and are cached
//! with `moka` (5-minute TTL). Mutations and private reads (orders,
//! addresses) use the API host with the write token and are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use stride_core::{CustomerId, ProductId};

use crate::config::SanityConfig;
use crate::sanity::ContentError;
use crate::sanity::cache::CacheValue;
use crate::sanity::queries;
use crate::sanity::types::{
    AddressDocument, Brand, Category, CheckoutProduct, Order, OrderDocument, Product,
};

/// Products shown on the home page "new arrivals" rail.
const NEW_ARRIVAL_COUNT: usize = 8;

/// Related products shown on the product detail page.
const RELATED_PRODUCT_COUNT: usize = 4;

// =============================================================================
// ContentClient
// =============================================================================

/// Client for the Sanity content backend.
///
/// Provides typed access to products, brands, categories, and orders.
/// Catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    /// CDN-backed query endpoint for public catalog reads.
    cdn_query_url: String,
    /// Non-CDN query endpoint for token-authenticated reads.
    api_query_url: String,
    /// Mutation endpoint.
    mutate_url: String,
    api_token: String,
    cache: Cache<String, CacheValue>,
}

/// Envelope around every Sanity query response.
#[derive(Debug, serde::Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// Envelope around a mutation response.
#[derive(Debug, serde::Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, serde::Deserialize)]
struct MutateResult {
    #[serde(default)]
    operation: Option<String>,
}

impl ContentClient {
    /// Create a new content backend client.
    #[must_use]
    pub fn new(config: &SanityConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let cdn_base = format!(
            "https://{}.apicdn.sanity.io/v{}/data",
            config.project_id, config.api_version
        );
        let api_base = format!(
            "https://{}.api.sanity.io/v{}/data",
            config.project_id, config.api_version
        );

        Self {
            inner: Arc::new(ContentClientInner {
                client: reqwest::Client::new(),
                cdn_query_url: format!("{cdn_base}/query/{}", config.dataset),
                api_query_url: format!("{api_base}/query/{}", config.dataset),
                mutate_url: format!("{api_base}/mutate/{}", config.dataset),
                api_token: config.api_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GROQ query against the CDN endpoint.
    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, ContentError> {
        self.execute(&self.inner.cdn_query_url, groq, params, false)
            .await
    }

    /// Execute a GROQ query against the authenticated (non-CDN) endpoint.
    async fn query_private<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, ContentError> {
        self.execute(&self.inner.api_query_url, groq, params, true)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        groq: &str,
        params: serde_json::Value,
        authenticated: bool,
    ) -> Result<Option<T>, ContentError> {
        let body = json!({
            "query": groq,
            "params": params,
        });

        let mut request = self.inner.client.post(url).json(&body);
        if authenticated {
            request = request.bearer_auth(&self.inner.api_token);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Sanity API returned non-success status"
            );
            return Err(ContentError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        let envelope: QueryResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Sanity query response"
            );
            ContentError::Parse(e)
        })?;

        Ok(envelope.result)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ContentError> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .query(&queries::all_products(), json!({}))
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get the newest products for the home page rail.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_new_arrivals(&self) -> Result<Vec<Product>, ContentError> {
        let cache_key = "products:new".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for new arrivals");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .query(&queries::new_arrivals(NEW_ARRIVAL_COUNT), json!({}))
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if no product has this slug, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, ContentError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .query(queries::PRODUCT_BY_SLUG, json!({ "slug": slug }))
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Product not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get products in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_products_by_category(&self, slug: &str) -> Result<Vec<Product>, ContentError> {
        let cache_key = format!("products:category:{slug}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .query(&queries::products_by_category(), json!({ "slug": slug }))
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get related products: same category, excluding the current product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(variant = %variant))]
    pub async fn get_related_products(
        &self,
        variant: &str,
        exclude: &ProductId,
    ) -> Result<Vec<Product>, ContentError> {
        let products: Vec<Product> = self
            .query(
                &queries::related_products(RELATED_PRODUCT_COUNT),
                json!({ "variant": variant, "currentProductId": exclude.as_str() }),
            )
            .await?
            .unwrap_or_default();

        Ok(products)
    }

    /// Get products by an explicit id list (wishlist resolution).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids))]
    pub async fn get_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, ContentError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products: Vec<Product> = self
            .query(&queries::products_by_id_list(), json!({ "ids": ids }))
            .await?
            .unwrap_or_default();

        Ok(products)
    }

    /// Fetch the authoritative checkout records for the submitted ids.
    ///
    /// Never cached: checkout validation must see current prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids))]
    pub async fn get_checkout_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<CheckoutProduct>, ContentError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products: Vec<CheckoutProduct> = self
            .query_private(queries::CHECKOUT_PRODUCTS, json!({ "ids": ids }))
            .await?
            .unwrap_or_default();

        Ok(products)
    }

    /// Get all brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<Vec<Brand>, ContentError> {
        let cache_key = "brands:all".to_string();

        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands: Vec<Brand> = self
            .query(queries::BRANDS, json!({}))
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ContentError> {
        let cache_key = "categories:all".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .query(queries::CATEGORIES, json!({}))
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` if no category has this slug, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, ContentError> {
        let cache_key = format!("category:{slug}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self
            .query(queries::CATEGORY_BY_SLUG, json!({ "slug": slug }))
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Category not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    // =========================================================================
    // Order Methods (authenticated, not cached)
    // =========================================================================

    /// Get a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_orders_for_user(
        &self,
        user_id: &CustomerId,
    ) -> Result<Vec<Order>, ContentError> {
        let orders: Vec<Order> = self
            .query_private(
                queries::ORDERS_FOR_USER,
                json!({ "userId": user_id.as_str() }),
            )
            .await?
            .unwrap_or_default();

        Ok(orders)
    }

    /// Get cached addresses for an email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_addresses_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<AddressDocument>, ContentError> {
        let addresses: Vec<AddressDocument> = self
            .query_private(queries::ADDRESSES_BY_EMAIL, json!({ "email": email }))
            .await?
            .unwrap_or_default();

        Ok(addresses)
    }

    // =========================================================================
    // Mutations (webhook write side)
    // =========================================================================

    /// Create an order document unless one with the same `_id` already
    /// exists.
    ///
    /// Returns `true` when the document was created, `false` when a document
    /// with this id already existed (redelivered webhook).
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation request fails.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn create_order_if_not_exists(
        &self,
        order: &OrderDocument,
    ) -> Result<bool, ContentError> {
        let response = self
            .mutate(json!({
                "mutations": [{ "createIfNotExists": order }]
            }))
            .await?;

        Ok(response
            .results
            .iter()
            .any(|r| r.operation.as_deref() == Some("create")))
    }

    /// Create an address document.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation request fails.
    #[instrument(skip(self, address))]
    pub async fn create_address(&self, address: &AddressDocument) -> Result<(), ContentError> {
        self.mutate(json!({
            "mutations": [{ "create": address }]
        }))
        .await?;

        Ok(())
    }

    async fn mutate(&self, body: serde_json::Value) -> Result<MutateResponse, ContentError> {
        let response = self
            .inner
            .client
            .post(&self.inner.mutate_url)
            .bearer_auth(&self.inner.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Sanity mutation returned non-success status"
            );
            return Err(ContentError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&response_text)?)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
