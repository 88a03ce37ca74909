use skydeck_core::perf_span;
use skydeck_net::Result;
use tracing::Instrument;

use super::ConsoleApi;
use crate::cascade::{OptionSource, OptionsResponse};
use crate::models::DeploymentSpace;

impl ConsoleApi {
    /// `POST /applications/{app}/environments/{env}/deployment-space`
    pub async fn create_deployment_space(
        &self,
        application_id: &str,
        environment_id: &str,
        space: &DeploymentSpace,
    ) -> Result<DeploymentSpace> {
        self.client
            .post(&format!(
                "/applications/{application_id}/environments/{environment_id}/deployment-space"
            ))
            .json(space)
            .json_response()
            .instrument(perf_span("create_deployment_space"))
            .await
    }

    /// `GET {path}?{query}` for one level of a cascading configurator.
    pub async fn fetch_next_options(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<OptionsResponse> {
        self.client
            .get(path)
            .query_pairs(query)
            .json_response()
            .instrument(perf_span("fetch_next_options"))
            .await
    }
}

impl OptionSource for ConsoleApi {
    async fn fetch_options(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<OptionsResponse> {
        self.fetch_next_options(path, query).await
    }
}
