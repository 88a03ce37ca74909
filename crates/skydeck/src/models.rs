//! Backend resource models.
//!
//! These mirror the JSON bodies of the console backend. Unknown fields are
//! ignored and optional fields default, so older clients keep working when
//! the backend grows new attributes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::CloudCredentials;

// ============================================================================
// Cloud accounts
// ============================================================================

/// A supported cloud provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    /// Google Cloud Platform.
    Gcp,
    /// Amazon Web Services.
    Aws,
    /// Microsoft Azure.
    Azure,
}

impl CloudProvider {
    /// All providers, in display order.
    pub const ALL: [CloudProvider; 3] = [Self::Gcp, Self::Aws, Self::Azure];

    /// Human-readable provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gcp => "Google Cloud",
            Self::Aws => "Amazon Web Services",
            Self::Azure => "Microsoft Azure",
        }
    }

    /// Wire identifier (`gcp`, `aws`, `azure`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Aws => "aws",
            Self::Azure => "azure",
        }
    }

    /// Parse a wire identifier, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcp" => Some(Self::Gcp),
            "aws" => Some(Self::Aws),
            "azure" => Some(Self::Azure),
            _ => None,
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected cloud account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudAccount {
    pub id: String,
    pub name: String,
    pub provider: CloudProvider,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /cloud-accounts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCloudAccount {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credentials: CloudCredentials,
}

impl NewCloudAccount {
    /// Provider of the attached credentials.
    pub fn provider(&self) -> CloudProvider {
        self.credentials.provider()
    }
}

/// A resource discovered inside a cloud account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudResource {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

// ============================================================================
// Applications
// ============================================================================

/// An application managed by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /applications`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApplication {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_account_id: Option<String>,
}

/// A deployment environment of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub deployment_space: Option<DeploymentSpace>,
}

// ============================================================================
// Deployment spaces
// ============================================================================

/// Body of `POST /applications/{app}/environments/{env}/deployment-space`,
/// also echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpace {
    pub name: String,
    /// Options chosen in the cascading configurator, outermost first.
    #[serde(default)]
    pub selections: Vec<serde_json::Value>,
    /// Metadata the backend attached to the final option set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Audits
// ============================================================================

/// Severity of an audit finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One finding of an audit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub id: String,
    pub category: String,
    pub title: String,
    pub severity: Severity,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Latest audit results of a cloud account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub cloud_account_id: String,
    #[serde(default)]
    pub findings: Vec<AuditFinding>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AuditResult {
    /// Findings at or above `severity`.
    pub fn findings_at_least(&self, severity: Severity) -> impl Iterator<Item = &AuditFinding> {
        self.findings.iter().filter(move |f| f.severity >= severity)
    }
}

/// Acknowledgement of a started audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRun {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// Workloads
// ============================================================================

/// A pod in an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub restarts: u32,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A service port mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: u16,
    #[serde(default)]
    pub target_port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// A service in an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub cluster_ip: Option<String>,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
}

/// A cron job in an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronJob {
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub last_schedule_time: Option<DateTime<Utc>>,
}

/// A deployment in an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub ready_replicas: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl Deployment {
    /// Whether every desired replica reports ready.
    pub fn is_ready(&self) -> bool {
        self.ready_replicas >= self.replicas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_account_ignores_unknown_fields() {
        let json = r#"{
            "id": "ca-1",
            "name": "prod",
            "provider": "aws",
            "created_at": "2024-03-01T12:00:00Z",
            "internal_shard": 7
        }"#;
        let account: CloudAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.provider, CloudProvider::Aws);
        assert_eq!(account.description, None);
        assert!(account.created_at.is_some());
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(CloudProvider::parse(" GCP "), Some(CloudProvider::Gcp));
        assert_eq!(CloudProvider::parse("oracle"), None);
        assert_eq!(CloudProvider::Azure.to_string(), "azure");
    }

    #[test]
    fn test_audit_severity_filter() {
        let json = r#"{
            "cloud_account_id": "ca-1",
            "findings": [
                {"id": "f1", "category": "iam", "title": "Root keys", "severity": "critical"},
                {"id": "f2", "category": "network", "title": "Open port", "severity": "low"}
            ]
        }"#;
        let result: AuditResult = serde_json::from_str(json).unwrap();
        let severe: Vec<_> = result.findings_at_least(Severity::High).collect();
        assert_eq!(severe.len(), 1);
        assert_eq!(severe[0].id, "f1");
    }

    #[test]
    fn test_deployment_readiness() {
        let deployment: Deployment =
            serde_json::from_str(r#"{"name": "web", "replicas": 3, "ready_replicas": 2}"#).unwrap();
        assert!(!deployment.is_ready());
    }
}
