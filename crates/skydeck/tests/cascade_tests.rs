//! Cascading configurator and deployment-space form against a mock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use skydeck::cascade::SelectOutcome;
use skydeck::notifications::ToastLevel;
use skydeck::{CascadeConfigurator, ConsoleApi, DeploymentSpaceForm, Error, NotificationBus};
use skydeck_net::MemoryTokenStore;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPACE_PATH: &str = "/applications/app-1/environments/env-1/deployment-space";

fn api_for(server: &MockServer) -> ConsoleApi {
    ConsoleApi::connect(
        &server.uri(),
        Duration::from_secs(5),
        Arc::new(MemoryTokenStore::with_token("t0k3n")),
    )
    .expect("Failed to build API client")
}

fn gcp() -> serde_json::Value {
    json!({"id": "gcp", "label": "Google Cloud"})
}

/// providers -> regions -> (terminal, with metadata)
async fn mount_options(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/options/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "options": [{"id": "gcp", "label": "Google Cloud"}, {"id": "aws"}],
            "next": {"path": "/options/regions", "params": {"provider": "id"}}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/options/regions"))
        .and(query_param("provider", "gcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "options": ["europe-west1", "us-central1"],
            "next": {"path": "/options/space", "params": {"region": "id"}}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/options/space"))
        .and(query_param("region", "europe-west1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "options": [],
            "metadata": {"space_type": "gke", "zones": 3}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/options/regions"))
        .and(query_param("provider", "aws"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": {"message": "AWS is not enabled"}})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_configurator_walks_backend_chain() {
    let server = MockServer::start().await;
    mount_options(&server).await;

    let mut chain = CascadeConfigurator::new(api_for(&server));
    chain.load_root("/options/providers").await.unwrap();
    assert_eq!(chain.frames()[0].labels(), vec!["Google Cloud", "aws"]);

    let outcome = chain.select_option(0, gcp()).await.unwrap();
    assert_eq!(outcome, SelectOutcome::Appended);
    assert_eq!(chain.frames().len(), 2);

    let outcome = chain.select_option(1, json!("europe-west1")).await.unwrap();
    assert_eq!(outcome, SelectOutcome::Complete);
    assert!(chain.is_complete());
    assert_eq!(chain.final_metadata(), Some(&json!({"space_type": "gke", "zones": 3})));
    assert_eq!(chain.selections(), vec![gcp(), json!("europe-west1")]);
}

#[tokio::test]
async fn test_reselect_upstream_truncates_and_reports_error() {
    let server = MockServer::start().await;
    mount_options(&server).await;

    let mut chain = CascadeConfigurator::new(api_for(&server));
    chain.load_root("/options/providers").await.unwrap();
    chain.select_option(0, gcp()).await.unwrap();
    chain.select_option(1, json!("europe-west1")).await.unwrap();

    let err = chain.select_option(0, json!({"id": "aws"})).await.unwrap_err();
    assert_eq!(Error::from(err).user_message(), "AWS is not enabled");
    assert_eq!(chain.frames().len(), 1);
    assert!(!chain.is_complete());
    assert_eq!(chain.last_error().and_then(|e| e.status()), Some(400));
}

#[tokio::test]
async fn test_deployment_space_submit() {
    let server = MockServer::start().await;
    mount_options(&server).await;
    Mock::given(method("POST"))
        .and(path(SPACE_PATH))
        .and(body_json(json!({
            "name": "eu-space",
            "selections": [{"id": "gcp", "label": "Google Cloud"}, "europe-west1"],
            "metadata": {"space_type": "gke", "zones": 3}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "eu-space",
            "selections": [{"id": "gcp"}, "europe-west1"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bus = NotificationBus::default();
    let mut form = DeploymentSpaceForm::new(api_for(&server), "app-1", "env-1");
    form.set_name("eu-space");
    form.load("/options/providers").await.unwrap();
    form.select_option(0, gcp()).await.unwrap();
    assert!(!form.can_submit());
    form.select_option(1, json!("europe-west1")).await.unwrap();
    assert!(form.can_submit());

    let space = form.submit(&bus).await.unwrap();
    assert_eq!(space.name, "eu-space");
    assert_eq!(bus.active()[0].level, ToastLevel::Success);
}

#[tokio::test]
async fn test_deployment_space_submit_conflict() {
    let server = MockServer::start().await;
    mount_options(&server).await;
    Mock::given(method("POST"))
        .and(path(SPACE_PATH))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({"error": {"message": "Environment already has a deployment space"}})),
        )
        .mount(&server)
        .await;

    let bus = NotificationBus::default();
    let mut form = DeploymentSpaceForm::new(api_for(&server), "app-1", "env-1");
    form.set_name("eu-space");
    form.load("/options/providers").await.unwrap();
    form.select_option(0, gcp()).await.unwrap();
    form.select_option(1, json!("europe-west1")).await.unwrap();

    let err = form.submit(&bus).await.unwrap_err();
    assert_eq!(err.user_message(), "Environment already has a deployment space");
    assert_eq!(form.last_error().and_then(|e| e.status()), Some(409));
    assert_eq!(bus.active()[0].level, ToastLevel::Error);
    // The chain survives a failed submit.
    assert!(form.configurator().is_complete());
}
