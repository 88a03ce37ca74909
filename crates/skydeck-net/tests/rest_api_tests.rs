//! Tests for the REST API client.

use std::sync::Arc;
use std::time::Duration;

use skydeck_net::auth::{MemoryTokenStore, TokenStore};
use skydeck_net::http::{HttpClientBuilder, HttpMethod, RequestBody, RestApiClient};
use skydeck_net::{NetworkError, SERVER_ERROR_MESSAGE};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_rest_api_client_base_url_normalization() {
    // Trailing slash should be removed
    let client = RestApiClient::builder("https://api.example.com/")
        .build()
        .expect("Failed to build client");

    assert_eq!(client.base_url(), "https://api.example.com");
}

#[test]
fn test_rest_api_client_rejects_bad_base_url() {
    let err = RestApiClient::builder("not a url").build().unwrap_err();
    assert!(matches!(err, NetworkError::InvalidUrl(_)));
}

#[test]
fn test_rest_api_request_builder() {
    let client = RestApiClient::builder("https://api.example.com")
        .build()
        .expect("Failed to build client");

    let request = client.get("/cloud-accounts").build();
    assert_eq!(request.url, "https://api.example.com/cloud-accounts");
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.bearer_token, None);

    // Path without leading slash
    let request = client.get("cloud-accounts").build();
    assert_eq!(request.url, "https://api.example.com/cloud-accounts");

    let request = client
        .post("/audit/all")
        .query("page", "2")
        .json(&serde_json::json!({"force": true}))
        .timeout(Duration::from_secs(5))
        .build();
    assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
    assert_eq!(
        request.body,
        RequestBody::Json(serde_json::json!({"force": true}))
    );
    assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    assert_eq!(
        request.headers.get("accept").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[test]
fn test_rest_api_all_methods() {
    let client = RestApiClient::builder("https://api.example.com")
        .build()
        .expect("Failed to build client");

    assert_eq!(client.get("/").build().method, HttpMethod::Get);
    assert_eq!(client.post("/").build().method, HttpMethod::Post);
    assert_eq!(client.put("/").build().method, HttpMethod::Put);
    assert_eq!(client.delete("/").build().method, HttpMethod::Delete);
    assert_eq!(client.patch("/").build().method, HttpMethod::Patch);
}

#[test]
fn test_token_store_read_per_request() {
    let store = Arc::new(MemoryTokenStore::new());
    let client = RestApiClient::builder("https://api.example.com")
        .token_store(store.clone())
        .build()
        .expect("Failed to build client");

    assert_eq!(client.get("/applications").build().bearer_token, None);

    store.set_token("fresh-token").unwrap();
    assert_eq!(
        client.get("/applications").build().bearer_token.as_deref(),
        Some("fresh-token")
    );

    // Explicit override wins over the store
    assert_eq!(
        client
            .get("/applications")
            .bearer_auth("other")
            .build()
            .bearer_token
            .as_deref(),
        Some("other")
    );
}

#[test]
fn test_custom_http_client_builder() {
    let client = RestApiClient::builder("https://api.example.com")
        .http_client_builder(HttpClientBuilder::new().timeout(Duration::from_secs(3)))
        .build()
        .expect("Failed to build client");

    assert_eq!(
        client.http_client().config().timeout,
        Some(Duration::from_secs(3))
    );
}

mod mocked {
    use super::*;

    async fn client_for(server: &MockServer, token: Option<&str>) -> RestApiClient {
        let store: Arc<dyn TokenStore> = match token {
            Some(t) => Arc::new(MemoryTokenStore::with_token(t)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        RestApiClient::builder(server.uri())
            .token_store(store)
            .build()
            .expect("Failed to build client")
    }

    #[tokio::test]
    async fn test_bearer_header_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cloud-accounts"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-token")).await;
        let accounts: Vec<serde_json::Value> = client
            .get("/cloud-accounts")
            .json_response()
            .await
            .unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn test_query_params_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cloud-accounts"))
            .and(query_param("dry_run", "true"))
            .and(body_json(serde_json::json!({"name": "prod"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "ca-1"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let created: serde_json::Value = client
            .post("/cloud-accounts")
            .query("dry_run", "true")
            .json(&serde_json::json!({"name": "prod"}))
            .json_response()
            .await
            .unwrap();
        assert_eq!(created["id"], "ca-1");
    }

    #[tokio::test]
    async fn test_client_error_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(409).set_body_json(
                serde_json::json!({"error": {"message": "Application name already exists"}}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let err = client
            .post("/applications")
            .json(&serde_json::json!({"name": "web"}))
            .empty_response()
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Application name already exists");
    }

    #[tokio::test]
    async fn test_server_error_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({"error": {"message": "stack trace: NullPointer"}}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let err = client.get("/applications").send().await.unwrap_err();

        assert_eq!(err, NetworkError::Server { status: 500 });
        assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_no_content_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cloud-accounts/ca-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, None).await;
        let body: Option<serde_json::Value> = client
            .delete("/cloud-accounts/ca-1")
            .optional_json_response()
            .await
            .unwrap();
        assert_eq!(body, None);

        let err = client
            .delete("/cloud-accounts/ca-1")
            .json_response::<serde_json::Value>()
            .await
            .unwrap_err();
        assert_eq!(err, NetworkError::EmptyBody);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop a server to get a port with nothing listening.
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let client = RestApiClient::builder(uri).build().unwrap();
        let err = client.get("/applications").send().await.unwrap_err();
        assert!(err.is_connection_error() || matches!(err, NetworkError::Request(_)));
    }

    #[tokio::test]
    async fn test_unserializable_body_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        // JSON object keys must be strings.
        let body: std::collections::HashMap<(u8, u8), u8> = [((1, 2), 3)].into();

        let client = client_for(&server, None).await;
        let err = client
            .post("/applications")
            .json(&body)
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Json(_)));
    }
}
