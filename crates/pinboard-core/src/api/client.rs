//! HTTP client for the pinboard REST API.
//!
//! Every request carries the session identity in the `X-User-Id` header.
//! The identity is fixed when the client is built; use
//! [`PostGateway::with_identity`] to switch users while sharing the pool.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::SyncCursor;
use crate::models::{DiscoveryImage, HealthStatus, NewPost, Post, PostId, PostPage, PostPatch};
use crate::session::Identity;

use super::{ApiError, PostGateway};

// ============================================================================
// Constants
// ============================================================================

/// Default API location (the backend's development port).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Header carrying the session identity.
const USER_ID_HEADER: &str = "X-User-Id";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the pinboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    identity: Identity,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, identity: Identity) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json")
            .header(USER_ID_HEADER, self.identity.as_str())
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            Err(Self::error_from_response(response).await.into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await.into())
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        debug!(status = status.as_u16(), error = %err, "API request rejected");
        err
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .request(Method::GET, path)
                .query(query)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", path))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::parse_json(response, path).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(path = path, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .request(method.clone(), path)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send {} request to {}", method, path))?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, path).await
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    fn list_query(page: u32, limit: u32, since: Option<SyncCursor>) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(cursor) = since {
            query.push(("min_date", cursor.to_iso()));
        }
        query
    }
}

impl PostGateway for ApiClient {
    /// Cheap: the clone shares the connection pool.
    fn with_identity(&self, identity: Identity) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            identity,
        }
    }

    async fn list_posts(&self, page: u32, limit: u32, since: Option<SyncCursor>) -> Result<PostPage> {
        let query = Self::list_query(page, limit, since);
        let result: PostPage = self.get("/posts", &query).await?;
        debug!(count = result.posts.len(), page, delta = since.is_some(), "Posts fetched");
        Ok(result)
    }

    async fn get_post(&self, id: PostId) -> Result<Post> {
        self.get(&format!("/posts/{}", id), &[]).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.send_json(Method::POST, "/posts", post).await
    }

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Post> {
        self.send_json(Method::PATCH, &format!("/posts/{}", id), patch).await
    }

    async fn replace_post(&self, id: PostId, post: &NewPost) -> Result<Post> {
        self.send_json(Method::PUT, &format!("/posts/{}", id), post).await
    }

    async fn delete_post(&self, id: PostId) -> Result<()> {
        let path = format!("/posts/{}", id);
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send DELETE request to {}", path))?;

        // 204 No Content; any body is ignored
        Self::check_response(response).await?;
        Ok(())
    }

    async fn list_discovery_images(&self, count: u32) -> Result<Vec<DiscoveryImage>> {
        self.get("/discover", &[("count", count.to_string())]).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", &[]).await
    }
}
