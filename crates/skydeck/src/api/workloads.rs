use std::fmt;

use serde::de::DeserializeOwned;
use skydeck_core::perf_span;
use skydeck_net::Result;
use tracing::Instrument;

use super::ConsoleApi;
use crate::models::{CronJob, Deployment, Pod, Service};

/// Kubernetes-style workload listings of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Pods,
    Services,
    CronJobs,
    Deployments,
}

impl WorkloadKind {
    /// Path segment under `/applications/{app}/environments/{env}/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Pods => "pods",
            Self::Services => "services",
            Self::CronJobs => "cron-jobs",
            Self::Deployments => "deployments",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl ConsoleApi {
    async fn list_workloads<T: DeserializeOwned>(
        &self,
        application_id: &str,
        environment_id: &str,
        kind: WorkloadKind,
    ) -> Result<Vec<T>> {
        let path = format!(
            "/applications/{application_id}/environments/{environment_id}/{}",
            kind.path_segment()
        );
        self.client.get(&path).json_response().await
    }

    /// `GET /applications/{app}/environments/{env}/pods`
    pub async fn list_pods(&self, application_id: &str, environment_id: &str) -> Result<Vec<Pod>> {
        self.list_workloads(application_id, environment_id, WorkloadKind::Pods)
            .instrument(perf_span("list_pods"))
            .await
    }

    /// `GET /applications/{app}/environments/{env}/services`
    pub async fn list_services(
        &self,
        application_id: &str,
        environment_id: &str,
    ) -> Result<Vec<Service>> {
        self.list_workloads(application_id, environment_id, WorkloadKind::Services)
            .instrument(perf_span("list_services"))
            .await
    }

    /// `GET /applications/{app}/environments/{env}/cron-jobs`
    pub async fn list_cron_jobs(
        &self,
        application_id: &str,
        environment_id: &str,
    ) -> Result<Vec<CronJob>> {
        self.list_workloads(application_id, environment_id, WorkloadKind::CronJobs)
            .instrument(perf_span("list_cron_jobs"))
            .await
    }

    /// `GET /applications/{app}/environments/{env}/deployments`
    pub async fn list_deployments(
        &self,
        application_id: &str,
        environment_id: &str,
    ) -> Result<Vec<Deployment>> {
        self.list_workloads(application_id, environment_id, WorkloadKind::Deployments)
            .instrument(perf_span("list_deployments"))
            .await
    }
}
