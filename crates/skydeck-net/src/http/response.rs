//! HTTP response types.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};

/// A successful (2xx) HTTP response with its body fully read.
///
/// Non-2xx responses never reach this type; they are mapped to
/// [`NetworkError`] by the REST client.
#[derive(Clone)]
pub struct HttpResponse {
    status: u16,
    headers: http::HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub(crate) fn new(status: u16, headers: http::HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the response is 204 No Content.
    pub fn is_no_content(&self) -> bool {
        self.status == 204
    }

    /// Get the response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON.
    ///
    /// A 204 (or an empty 2xx body) is an error here; use [`json_opt`](Self::json_opt)
    /// when the endpoint may answer without a body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.json_opt()?.ok_or(NetworkError::EmptyBody)
    }

    /// Parse the body as JSON, yielding `None` for 204 or an empty body.
    pub fn json_opt<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_no_content() || self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&self.body)?))
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse::new(status, http::HeaderMap::new(), Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_no_content_has_no_body() {
        let resp = response(204, "");
        assert_eq!(resp.json_opt::<serde_json::Value>().unwrap(), None);
        assert_eq!(resp.json::<serde_json::Value>().unwrap_err(), NetworkError::EmptyBody);
    }

    #[test]
    fn test_json_body() {
        let resp = response(200, r#"{"id":"ca-1"}"#);
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["id"], "ca-1");
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let resp = response(200, "{not json");
        assert!(matches!(
            resp.json::<serde_json::Value>(),
            Err(NetworkError::Json(_))
        ));
    }
}
