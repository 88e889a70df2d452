//! # HTTP Backend
//!
//! [`StorefrontBackend`] over the storefront REST API, using `reqwest`.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  build request ──► x-request-id: <uuid v4> ──► send                    │
//! │                                                  │                      │
//! │                    ┌─────────────────────────────┼──────────────┐       │
//! │                    ▼                             ▼              ▼       │
//! │              no response                   2xx status      4xx / 5xx    │
//! │         Request / Timeout error            decode JSON     { success:   │
//! │                                                             false,      │
//! │                                                             message }   │
//! │                                                             → Api error │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use storefront_core::{Address, CartRecord, Product};
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::backend::{LoginResponse, StorefrontBackend};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Failure body the backend sends alongside 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// REST client for the storefront backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Creates a client for the API rooted at `endpoint`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Url::parse(&endpoint)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.endpoint(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// `path` plus one trailing segment, percent-encoded so ids containing
    /// `/`, `?` or spaces stay a single segment.
    fn url_with_segment(&self, path: &str, segment: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.url(path))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl("endpoint cannot take path segments".into()))?
            .push(segment);
        Ok(url)
    }

    /// Sends the request and turns any non-2xx status into [`ClientError::Api`].
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request_id = Uuid::new_v4();
        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(%request_id, status = status.as_u16(), url = %response.url(), "Backend responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => err.message,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };

        warn!(%request_id, status = status.as_u16(), message = %message, "Backend request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::from(err)
        }
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> ClientResult<Vec<Product>> {
        self.send_json(self.client.get(self.url("/products"))).await
    }

    #[instrument(skip(self))]
    async fn search_catalog(&self, query: &str) -> ClientResult<Vec<Product>> {
        let request = self
            .client
            .get(self.url("/products/search"))
            .query(&[("value", query)]);
        self.send_json(request).await
    }

    #[instrument(skip_all)]
    async fn fetch_cart_records(&self, token: &str) -> ClientResult<Vec<CartRecord>> {
        let request = self.client.get(self.url("/cart")).bearer_auth(token);
        self.send_json(request).await
    }

    #[instrument(skip(self, token))]
    async fn update_cart(
        &self,
        token: &str,
        product_id: &str,
        quantity: i64,
    ) -> ClientResult<Vec<CartRecord>> {
        let request = self
            .client
            .post(self.url("/cart"))
            .bearer_auth(token)
            .json(&CartRecord::new(product_id, quantity));
        self.send_json(request).await
    }

    #[instrument(skip(self, token))]
    async fn submit_checkout(&self, token: &str, address_id: &str) -> ClientResult<()> {
        let request = self
            .client
            .post(self.url("/cart/checkout"))
            .bearer_auth(token)
            .json(&json!({ "addressId": address_id }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn fetch_addresses(&self, token: &str) -> ClientResult<Vec<Address>> {
        let request = self.client.get(self.url("/user/addresses")).bearer_auth(token);
        self.send_json(request).await
    }

    #[instrument(skip_all)]
    async fn add_address(&self, token: &str, text: &str) -> ClientResult<Vec<Address>> {
        let request = self
            .client
            .post(self.url("/user/addresses"))
            .bearer_auth(token)
            .json(&json!({ "address": text }));
        self.send_json(request).await
    }

    #[instrument(skip(self, token))]
    async fn delete_address(&self, token: &str, address_id: &str) -> ClientResult<Vec<Address>> {
        let url = self.url_with_segment("/user/addresses", address_id)?;
        let request = self.client.delete(url).bearer_auth(token);
        self.send_json(request).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }));
        self.send_json(request).await
    }

    #[instrument(skip(self, password))]
    async fn register(&self, username: &str, password: &str) -> ClientResult<()> {
        let request = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }));
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = HttpBackend::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_joining() {
        let backend =
            HttpBackend::new("http://localhost:8082/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8082/api/v1");
        assert_eq!(backend.url("/products"), "http://localhost:8082/api/v1/products");
    }

    #[test]
    fn test_address_id_is_one_escaped_segment() {
        let backend =
            HttpBackend::new("http://localhost:8082/api/v1", Duration::from_secs(5)).unwrap();

        let url = backend.url_with_segment("/user/addresses", "a1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/api/v1/user/addresses/a1");

        let url = backend
            .url_with_segment("/user/addresses", "../a 1?x=#y/z")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8082/api/v1/user/addresses/..%2Fa%201%3Fx=%23y%2Fz"
        );
        assert_eq!(url.path_segments().map(|s| s.count()), Some(5));
    }
}
