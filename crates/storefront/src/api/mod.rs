//! Shop backend API.
//!
//! [`ShopApi`] is the network collaborator the presenter awaits before
//! feeding results into the synchronous state. [`LarekClient`] implements
//! it over HTTP.
//!
//! # Endpoints
//!
//! - `GET {api}/product` - catalog listing (`{total, items}`)
//! - `GET {api}/product/{id}` - single item
//! - `POST {api}/order` - order submission (`{id, total}`)
//!
//! Item images come back as paths relative to the CDN and are rewritten to
//! absolute URLs before they leave this module.

mod types;

pub use types::*;

use std::future::Future;
use std::sync::Arc;

use larek_core::{CatalogItem, CatalogItemUpdate, ItemId, OrderReceipt, OrderRequest};
use moka::future::Cache;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::StorefrontConfig;

/// Maximum number of item details kept in the cache.
const ITEM_CACHE_CAPACITY: u64 = 1_000;

/// Errors that can occur when talking to the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Operations the shop client needs from its backend.
pub trait ShopApi: Send + Sync {
    /// Full catalog with absolute image URLs.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<CatalogItem>, ApiError>> + Send;

    /// One catalog item by id.
    fn fetch_item(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = Result<CatalogItem, ApiError>> + Send;

    /// Current title and price of one item, bypassing any cache.
    fn fetch_item_update(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = Result<CatalogItemUpdate, ApiError>> + Send;

    /// Place an order.
    fn submit_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;
}

/// HTTP client for the shop backend.
#[derive(Clone)]
pub struct LarekClient {
    inner: Arc<LarekClientInner>,
}

struct LarekClientInner {
    client: reqwest::Client,
    api_url: String,
    cdn_url: String,
    item_cache: Option<Cache<ItemId, CatalogItem>>,
}

impl LarekClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        // A zero TTL turns item caching off.
        let item_cache = (!config.item_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(ITEM_CACHE_CAPACITY)
                .time_to_live(config.item_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(LarekClientInner {
                client,
                api_url: config.api_url.clone(),
                cdn_url: config.cdn_url.clone(),
                item_cache,
            }),
        })
    }

    /// Base URL of the JSON API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    /// Execute a GET request against the API.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.inner.api_url);
        let response = self.inner.client.get(&url).send().await?;
        Self::handle_response(path, response).await
    }

    /// Execute a POST request against the API.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.inner.api_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::handle_response(path, response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        let body = response.text().await.unwrap_or_default();
        let error = error_from_response(path, status, &body);
        warn!(path, status = status.as_u16(), error = %error, "shop API request failed");
        Err(error)
    }

    fn with_cdn(&self, mut item: CatalogItem) -> CatalogItem {
        item.image = resolve_image(&self.inner.cdn_url, &item.image);
        item
    }
}

impl std::fmt::Debug for LarekClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LarekClient")
            .field("api_url", &self.inner.api_url)
            .field("cdn_url", &self.inner.cdn_url)
            .field("item_cache", &self.inner.item_cache.is_some())
            .finish_non_exhaustive()
    }
}

impl ShopApi for LarekClient {
    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let list: ApiListResponse<CatalogItem> = self.get("/product").await?;
        debug!(total = list.total, received = list.items.len(), "fetched catalog");

        // Item details cached before this listing may be stale now.
        if let Some(cache) = &self.inner.item_cache {
            cache.invalidate_all();
        }

        Ok(list.items.into_iter().map(|item| self.with_cdn(item)).collect())
    }

    #[instrument(skip(self), fields(item = %id))]
    async fn fetch_item(&self, id: &ItemId) -> Result<CatalogItem, ApiError> {
        if let Some(cache) = &self.inner.item_cache
            && let Some(cached) = cache.get(id).await
        {
            debug!("item cache hit");
            return Ok(cached);
        }

        let item: CatalogItem = self.get(&format!("/product/{id}")).await?;
        let item = self.with_cdn(item);

        if let Some(cache) = &self.inner.item_cache {
            cache.insert(id.clone(), item.clone()).await;
        }
        Ok(item)
    }

    #[instrument(skip(self), fields(item = %id))]
    async fn fetch_item_update(&self, id: &ItemId) -> Result<CatalogItemUpdate, ApiError> {
        self.get(&format!("/product/{id}")).await
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        let receipt: OrderReceipt = self.post("/order", order).await?;
        debug!(order = %receipt.id, "order accepted");
        Ok(receipt)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Absolute URL for an image reference returned by the backend.
///
/// Empty references stay empty and absolute URLs pass through unchanged.
#[must_use]
pub fn resolve_image(cdn_url: &str, image: &str) -> String {
    if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    let cdn = cdn_url.trim_end_matches('/');
    let path = image.trim_start_matches('/');
    format!("{cdn}/{path}")
}

/// Map a non-success response to an [`ApiError`].
///
/// The message comes from the body's `error` field when present, else from
/// the status reason.
fn error_from_response(path: &str, status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(path.to_string());
    }
    let message = serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        },
        |parsed| parsed.error,
    );
    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    const CDN: &str = "https://larek-api.nomoreparties.co/content/weblarek";

    #[test]
    fn test_resolve_image_prefixes_cdn() {
        assert_eq!(resolve_image(CDN, "/5_Dots.svg"), format!("{CDN}/5_Dots.svg"));
        assert_eq!(resolve_image(CDN, "Shell.svg"), format!("{CDN}/Shell.svg"));
        assert_eq!(
            resolve_image(&format!("{CDN}/"), "/Shell.svg"),
            format!("{CDN}/Shell.svg")
        );
    }

    #[test]
    fn test_resolve_image_keeps_absolute_and_empty() {
        let absolute = "https://images.example.com/a.png";
        assert_eq!(resolve_image(CDN, absolute), absolute);
        assert_eq!(resolve_image(CDN, ""), "");
    }

    #[test]
    fn test_error_message_from_body() {
        let error = error_from_response(
            "/order",
            StatusCode::BAD_REQUEST,
            r#"{"error": "Wrong total"}"#,
        );
        assert!(matches!(
            error,
            ApiError::Api { status: 400, ref message } if message == "Wrong total"
        ));
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        let error = error_from_response("/order", StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert!(matches!(
            error,
            ApiError::Api { status: 500, ref message } if message == "Internal Server Error"
        ));
    }

    #[test]
    fn test_not_found() {
        let error = error_from_response("/product/x", StatusCode::NOT_FOUND, "");
        assert!(matches!(error, ApiError::NotFound(ref path) if path == "/product/x"));
    }

    #[test]
    fn test_client_cache_follows_ttl() {
        let mut config = StorefrontConfig::from_lookup(|key| {
            (key == crate::config::API_ORIGIN_VAR).then(|| "http://localhost:3000".to_string())
        })
        .unwrap();

        let client = LarekClient::new(&config).unwrap();
        assert!(client.inner.item_cache.is_some());
        assert_eq!(client.api_url(), "http://localhost:3000/api/weblarek");

        config.item_cache_ttl = Duration::ZERO;
        let client = LarekClient::new(&config).unwrap();
        assert!(client.inner.item_cache.is_none());
    }
}
