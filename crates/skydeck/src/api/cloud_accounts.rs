use skydeck_core::perf_span;
use skydeck_net::Result;
use tracing::Instrument;

use super::ConsoleApi;
use crate::models::{CloudAccount, CloudResource, NewCloudAccount};

impl ConsoleApi {
    /// `GET /cloud-accounts`
    pub async fn list_cloud_accounts(&self) -> Result<Vec<CloudAccount>> {
        self.client
            .get("/cloud-accounts")
            .json_response()
            .instrument(perf_span("list_cloud_accounts"))
            .await
    }

    /// `GET /cloud-accounts/{id}`
    pub async fn get_cloud_account(&self, id: &str) -> Result<CloudAccount> {
        self.client
            .get(&format!("/cloud-accounts/{id}"))
            .json_response()
            .instrument(perf_span("get_cloud_account"))
            .await
    }

    /// `POST /cloud-accounts`
    pub async fn create_cloud_account(&self, account: &NewCloudAccount) -> Result<CloudAccount> {
        tracing::info!(
            target: skydeck_core::logging::targets::API,
            name = %account.name,
            provider = %account.provider(),
            "creating cloud account"
        );
        self.client
            .post("/cloud-accounts")
            .json(account)
            .json_response()
            .instrument(perf_span("create_cloud_account"))
            .await
    }

    /// `DELETE /cloud-accounts/{id}`
    pub async fn delete_cloud_account(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("/cloud-accounts/{id}"))
            .empty_response()
            .instrument(perf_span("delete_cloud_account"))
            .await
    }

    /// `GET /cloud-account/{id}/resources`
    pub async fn list_cloud_resources(&self, id: &str) -> Result<Vec<CloudResource>> {
        self.client
            .get(&format!("/cloud-account/{id}/resources"))
            .json_response()
            .instrument(perf_span("list_cloud_resources"))
            .await
    }
}
