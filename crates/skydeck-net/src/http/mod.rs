//! HTTP plumbing for the console backend.
//!
//! [`RestApiClient`] is the entry point: it binds a base URL, JSON headers
//! and a token store, and maps every non-2xx response to a
//! [`NetworkError`](crate::NetworkError).
//!
//! # Example
//!
//! ```ignore
//! use skydeck_net::http::RestApiClient;
//!
//! let client = RestApiClient::builder("https://api.example.com").build()?;
//! let apps: Vec<Application> = client.get("/applications").json_response().await?;
//! ```

mod client;
mod request;
mod response;
mod rest_api;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpMethod, HttpRequest, RequestBody};
pub use response::HttpResponse;
pub use rest_api::{RestApiClient, RestApiClientBuilder, RestApiRequestBuilder};
