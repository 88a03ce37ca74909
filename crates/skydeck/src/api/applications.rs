use skydeck_core::perf_span;
use skydeck_net::Result;
use tracing::Instrument;

use super::ConsoleApi;
use crate::models::{Application, Environment, NewApplication};

impl ConsoleApi {
    /// `GET /applications`
    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        self.client
            .get("/applications")
            .json_response()
            .instrument(perf_span("list_applications"))
            .await
    }

    /// `GET /applications/{id}`
    pub async fn get_application(&self, id: &str) -> Result<Application> {
        self.client
            .get(&format!("/applications/{id}"))
            .json_response()
            .instrument(perf_span("get_application"))
            .await
    }

    /// `POST /applications`
    pub async fn create_application(&self, application: &NewApplication) -> Result<Application> {
        self.client
            .post("/applications")
            .json(application)
            .json_response()
            .instrument(perf_span("create_application"))
            .await
    }

    /// `GET /applications/{id}/environments`
    pub async fn list_environments(&self, application_id: &str) -> Result<Vec<Environment>> {
        self.client
            .get(&format!("/applications/{application_id}/environments"))
            .json_response()
            .instrument(perf_span("list_environments"))
            .await
    }
}
