//! Networking for Skydeck.
//!
//! - **REST client**: JSON requests against one backend base URL, with the
//!   bearer token attached from a [`TokenStore`](auth::TokenStore).
//! - **Error mapping**: 4xx responses keep the backend's
//!   `{ "error": { "message" } }` text; 5xx responses collapse to one
//!   generic message.
//! - **Token storage**: in-memory or a JSON file in the user data directory.
//!
//! ```ignore
//! use std::sync::Arc;
//! use skydeck_net::{RestApiClient, auth::FileTokenStore};
//!
//! let store = Arc::new(FileTokenStore::new("/tmp/token.json"));
//! let client = RestApiClient::builder("https://api.example.com")
//!     .token_store(store)
//!     .build()?;
//! ```

mod error;
pub mod auth;
pub mod http;

pub use error::{CONNECTION_ERROR_MESSAGE, NetworkError, Result, SERVER_ERROR_MESSAGE};

// Re-export commonly used types at the crate root
pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use http::{
    HttpClient, HttpClientBuilder, HttpMethod, HttpRequest, HttpResponse, RequestBody,
    RestApiClient, RestApiClientBuilder, RestApiRequestBuilder,
};
