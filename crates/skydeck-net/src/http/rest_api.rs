//! REST API client for the console backend.
//!
//! Every request goes to a path relative to one base URL, carries JSON
//! `Accept`/`Content-Type` headers and, when a token is stored, an
//! `Authorization: Bearer` header. Non-2xx responses are mapped to a
//! typed [`NetworkError`]; 5xx bodies are never surfaced.
//!
//! There is deliberately no retry or rate limiting here: a failed call is
//! reported once and the user retries the action.
//!
//! # Example
//!
//! ```ignore
//! use skydeck_net::http::RestApiClient;
//!
//! let client = RestApiClient::builder("https://api.example.com")
//!     .token_store(store)
//!     .build()?;
//!
//! // GET /cloud-accounts
//! let accounts: Vec<CloudAccount> = client.get("/cloud-accounts").json_response().await?;
//!
//! // POST with JSON body
//! let created: CloudAccount = client.post("/cloud-accounts")
//!     .json(&new_account)
//!     .json_response()
//!     .await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use skydeck_core::logging::targets;

use super::client::{HttpClient, HttpClientBuilder};
use super::request::{HttpMethod, HttpRequest, RequestBody};
use super::response::HttpResponse;
use crate::auth::TokenStore;
use crate::error::{NetworkError, Result};

/// Builder for creating a REST API client.
pub struct RestApiClientBuilder {
    base_url: String,
    http_client: Option<HttpClient>,
    http_client_builder: Option<HttpClientBuilder>,
    default_headers: http::HeaderMap,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl RestApiClientBuilder {
    /// Create a new builder with the specified base URL.
    ///
    /// All request paths will be appended to this base URL. JSON `Accept`
    /// and `Content-Type` headers are set by default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: None,
            http_client_builder: None,
            default_headers: http::HeaderMap::new(),
            token_store: None,
        }
        .default_header(http::header::ACCEPT, "application/json")
        .default_header(http::header::CONTENT_TYPE, "application/json")
    }

    /// Use an existing HTTP client instead of creating a new one.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom HTTP client builder for advanced configuration.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.http_client_builder = Some(builder);
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.default_headers.insert(name, value);
        }
        self
    }

    /// Read the bearer token from `store` on every request.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Build the REST API client.
    pub fn build(self) -> Result<RestApiClient> {
        let http_client = if let Some(client) = self.http_client {
            client
        } else if let Some(builder) = self.http_client_builder {
            builder.build()?
        } else {
            HttpClient::with_defaults()?
        };

        let base_url = self.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        Ok(RestApiClient {
            inner: Arc::new(RestApiClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                token_store: self.token_store,
            }),
        })
    }
}

struct RestApiClientInner {
    http_client: HttpClient,
    base_url: String,
    default_headers: http::HeaderMap,
    token_store: Option<Arc<dyn TokenStore>>,
}

/// A REST API client bound to one backend.
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone)]
pub struct RestApiClient {
    inner: Arc<RestApiClientInner>,
}

impl RestApiClient {
    /// Create a new builder for configuring a REST API client.
    pub fn builder(base_url: impl Into<String>) -> RestApiClientBuilder {
        RestApiClientBuilder::new(base_url)
    }

    /// Get the base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Get a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &HttpClient {
        &self.inner.http_client
    }

    /// The token store, if one was configured.
    pub fn token_store(&self) -> Option<&Arc<dyn TokenStore>> {
        self.inner.token_store.as_ref()
    }

    /// Create a GET request builder.
    pub fn get(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Get, path)
    }

    /// Create a POST request builder.
    pub fn post(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Post, path)
    }

    /// Create a PUT request builder.
    pub fn put(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Put, path)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Delete, path)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, path: &str) -> RestApiRequestBuilder {
        self.request(HttpMethod::Patch, path)
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: HttpMethod, path: &str) -> RestApiRequestBuilder {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let url = format!("{}{}", self.inner.base_url, path);

        RestApiRequestBuilder {
            client: self.clone(),
            method,
            url,
            headers: self.inner.default_headers.clone(),
            query: Vec::new(),
            body: RequestBody::None,
            body_error: None,
            timeout: None,
            token_override: None,
        }
    }
}

impl std::fmt::Debug for RestApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestApiClient")
            .field("base_url", &self.inner.base_url)
            .field("has_token_store", &self.inner.token_store.is_some())
            .finish()
    }
}

/// Builder for REST API requests.
pub struct RestApiRequestBuilder {
    client: RestApiClient,
    method: HttpMethod,
    url: String,
    headers: http::HeaderMap,
    query: Vec<(String, String)>,
    body: RequestBody,
    body_error: Option<NetworkError>,
    timeout: Option<Duration>,
    token_override: Option<String>,
}

impl RestApiRequestBuilder {
    /// Add a header to the request.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add multiple query parameters.
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Set a JSON body from a serializable value.
    ///
    /// A serialization failure is reported by [`send`](Self::send), which
    /// then returns [`NetworkError::Json`] without contacting the backend.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = RequestBody::Json(value);
                self.body_error = None;
            }
            Err(e) => {
                tracing::error!(target: targets::HTTP, "Failed to serialize JSON body: {}", e);
                self.body = RequestBody::None;
                self.body_error = Some(NetworkError::from(e));
            }
        }
        self
    }

    /// Use this bearer token instead of the stored one.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.token_override = Some(token.into());
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the request without sending it.
    ///
    /// The stored token is read here, so each request sees the latest one.
    pub fn build(self) -> HttpRequest {
        let bearer_token = self.token_override.or_else(|| {
            self.client
                .inner
                .token_store
                .as_ref()
                .and_then(|store| store.token())
        });

        HttpRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            timeout: self.timeout,
            bearer_token,
        }
    }

    /// Send the request.
    ///
    /// Returns the response for 2xx statuses; any other status becomes an
    /// error via [`NetworkError::from_status`].
    pub async fn send(mut self) -> Result<HttpResponse> {
        if let Some(err) = self.body_error.take() {
            return Err(err);
        }
        let client = self.client.clone();
        let request = self.build();
        execute(client.http_client(), request).await
    }

    /// Send the request and parse the response body as JSON.
    pub async fn json_response<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.json()
    }

    /// Send the request and parse the body as JSON, `None` on 204.
    pub async fn optional_json_response<T: DeserializeOwned>(self) -> Result<Option<T>> {
        self.send().await?.json_opt()
    }

    /// Send the request and discard any body.
    pub async fn empty_response(self) -> Result<()> {
        self.send().await.map(|_| ())
    }
}

async fn execute(http_client: &HttpClient, request: HttpRequest) -> Result<HttpResponse> {
    let url = request.full_url()?;
    let method = request.method;

    let mut req_builder = http_client
        .reqwest_client()
        .request(method.to_reqwest(), url.clone());

    for (name, value) in request.headers.iter() {
        req_builder = req_builder.header(name, value);
    }

    if let Some(token) = &request.bearer_token {
        req_builder = req_builder.bearer_auth(token);
    }

    if let Some(timeout) = request.timeout {
        req_builder = req_builder.timeout(timeout);
    }

    if let RequestBody::Json(value) = &request.body {
        req_builder = req_builder.json(value);
    }

    tracing::debug!(target: targets::HTTP, %method, url = %url.path(), "sending request");

    let response = req_builder.send().await.map_err(|e| {
        let err = NetworkError::from(e);
        tracing::warn!(target: targets::HTTP, %method, url = %url.path(), "request failed: {err}");
        err
    })?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    if !(200..300).contains(&status) {
        let err = NetworkError::from_status(status, &String::from_utf8_lossy(&body));
        tracing::warn!(target: targets::HTTP, %method, url = %url.path(), status, "backend returned error: {err}");
        return Err(err);
    }

    tracing::debug!(target: targets::HTTP, %method, url = %url.path(), status, "request completed");
    Ok(HttpResponse::new(status, headers, body))
}
