//! Typed calls against the console backend.
//!
//! [`ConsoleApi`] groups one method per backend operation. Each call is a
//! thin wrapper over [`RestApiClient`]: it builds the path, sends the
//! request and decodes the JSON body. Errors are returned as-is; callers
//! that want loading/error state wrap calls in a [`Query`](crate::query::Query).
//!
//! Every call runs inside a `perf` span named after the operation.

mod applications;
mod audit;
mod cloud_accounts;
mod deployment_spaces;
mod workloads;

use std::sync::Arc;
use std::time::Duration;

use skydeck_net::http::{HttpClient, RestApiClient};
use skydeck_net::{Result, TokenStore};

pub use workloads::WorkloadKind;

/// Client for the console backend.
#[derive(Debug, Clone)]
pub struct ConsoleApi {
    client: RestApiClient,
}

impl ConsoleApi {
    /// Wrap an already configured REST client.
    pub fn new(client: RestApiClient) -> Self {
        Self { client }
    }

    /// Build a client for `base_url` reading its bearer token from `tokens`.
    pub fn connect(
        base_url: &str,
        request_timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let http = HttpClient::builder().timeout(request_timeout).build()?;
        let client = RestApiClient::builder(base_url)
            .http_client(http)
            .token_store(tokens)
            .build()?;
        Ok(Self::new(client))
    }

    /// The underlying REST client.
    pub fn client(&self) -> &RestApiClient {
        &self.client
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}
