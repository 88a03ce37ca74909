//! Deployment-space form for an application environment.
//!
//! The form pairs a name field with a [`CascadeConfigurator`] whose options
//! come from the backend. It can be submitted once the name is valid and the
//! chain is complete.

use serde_json::Value;
use skydeck_core::logging::targets;
use skydeck_net::NetworkError;

use crate::api::ConsoleApi;
use crate::cascade::{CascadeConfigurator, SelectOutcome};
use crate::error::{Error, Result};
use crate::models::DeploymentSpace;
use crate::notifications::NotificationBus;
use crate::validation::{ValidationError, ValidationResult, Validator};

/// Form state for creating a deployment space.
#[derive(Debug)]
pub struct DeploymentSpaceForm {
    application_id: String,
    environment_id: String,
    name: String,
    configurator: CascadeConfigurator<ConsoleApi>,
    last_error: Option<NetworkError>,
}

impl DeploymentSpaceForm {
    /// Empty form for `environment_id` of `application_id`.
    pub fn new(
        api: ConsoleApi,
        application_id: impl Into<String>,
        environment_id: impl Into<String>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            environment_id: environment_id.into(),
            name: String::new(),
            configurator: CascadeConfigurator::new(api),
            last_error: None,
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the space name. Surrounding whitespace is dropped.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
    }

    /// The option chain.
    pub fn configurator(&self) -> &CascadeConfigurator<ConsoleApi> {
        &self.configurator
    }

    /// Error of the last failed submission.
    pub fn last_error(&self) -> Option<&NetworkError> {
        self.last_error.as_ref()
    }

    /// Load the first option set from `root_path`.
    pub async fn load(&mut self, root_path: &str) -> Result<()> {
        self.configurator.load_root(root_path).await?;
        Ok(())
    }

    /// Select `option` in frame `frame_index` of the chain.
    pub async fn select_option(&mut self, frame_index: usize, option: Value) -> Result<SelectOutcome> {
        Ok(self.configurator.select_option(frame_index, option).await?)
    }

    /// Check the name and the chain.
    pub fn validate(&self) -> ValidationResult {
        let mut result = Validator::required("name", &self.name);
        if result.is_valid() {
            result.merge(Validator::resource_name("name", &self.name));
        }
        if !self.configurator.is_complete() {
            result.add_error(ValidationError::with_field(
                "configuration",
                "Finish selecting the configuration",
            ));
        }
        result
    }

    /// Whether [`submit`](Self::submit) would send a request.
    pub fn can_submit(&self) -> bool {
        self.validate().is_valid()
    }

    /// The payload `submit` sends.
    pub fn to_deployment_space(&self) -> DeploymentSpace {
        DeploymentSpace {
            name: self.name.clone(),
            selections: self.configurator.selections(),
            metadata: self.configurator.final_metadata().cloned(),
        }
    }

    /// Create the deployment space.
    ///
    /// Publishes a toast either way. Nothing is sent when the form does not
    /// validate.
    pub async fn submit(&mut self, notifications: &NotificationBus) -> Result<DeploymentSpace> {
        let validation = self.validate();
        if !validation.is_valid() {
            return Err(Error::Invalid(validation));
        }

        let space = self.to_deployment_space();
        self.last_error = None;
        let result = self
            .configurator
            .source()
            .create_deployment_space(&self.application_id, &self.environment_id, &space)
            .await;

        match result {
            Ok(created) => {
                tracing::info!(
                    target: targets::API,
                    application = %self.application_id,
                    environment = %self.environment_id,
                    "deployment space created"
                );
                notifications.success(format!("Deployment space \"{}\" created", created.name));
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(target: targets::API, "deployment space creation failed: {err}");
                notifications.network_error(&err);
                self.last_error = Some(err.clone());
                Err(err.into())
            }
        }
    }
}
