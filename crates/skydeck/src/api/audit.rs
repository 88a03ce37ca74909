use skydeck_core::perf_span;
use skydeck_net::Result;
use tracing::Instrument;

use super::ConsoleApi;
use crate::models::{AuditResult, AuditRun};

impl ConsoleApi {
    /// `GET /audit/cloud-accounts/{id}/results`
    pub async fn audit_results(&self, cloud_account_id: &str) -> Result<AuditResult> {
        self.client
            .get(&format!("/audit/cloud-accounts/{cloud_account_id}/results"))
            .json_response()
            .instrument(perf_span("audit_results"))
            .await
    }

    /// `POST /audit/cloud-accounts/{id}/all`
    ///
    /// Starts a full audit. The backend may answer 204, in which case there
    /// is no run handle.
    pub async fn run_audit(&self, cloud_account_id: &str) -> Result<Option<AuditRun>> {
        self.client
            .post(&format!("/audit/cloud-accounts/{cloud_account_id}/all"))
            .optional_json_response()
            .instrument(perf_span("run_audit"))
            .await
    }

    /// `POST /audit/cloud-accounts/{id}/category/{category}`
    pub async fn run_audit_category(
        &self,
        cloud_account_id: &str,
        category: &str,
    ) -> Result<Option<AuditRun>> {
        self.client
            .post(&format!(
                "/audit/cloud-accounts/{cloud_account_id}/category/{category}"
            ))
            .optional_json_response()
            .instrument(perf_span("run_audit_category"))
            .await
    }
}
