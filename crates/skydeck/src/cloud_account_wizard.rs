//! The "connect a cloud account" wizard.
//!
//! Four steps: Provider, Credentials, Details, Review. Each setter validates
//! its step locally and reports the outcome with `set_step_complete`, so the
//! Next button is enabled exactly when the current step's fields pass.
//! [`finish`](CloudAccountWizard::finish) posts the account; on failure the
//! wizard stays on Review with the error kept for display.

use skydeck_core::logging::targets;
use skydeck_net::NetworkError;

use crate::api::ConsoleApi;
use crate::credentials::{CloudCredentials, GcpCredentials};
use crate::error::{Error, Result};
use crate::models::{CloudAccount, CloudProvider, NewCloudAccount};
use crate::notifications::NotificationBus;
use crate::store::AppStore;
use crate::validation::{ValidationResult, Validator};
use crate::wizard::{NavigationOutcome, WizardError, WizardSession, WizardStep};

/// Step indices of the cloud-account wizard.
pub mod steps {
    pub const PROVIDER: usize = 0;
    pub const CREDENTIALS: usize = 1;
    pub const DETAILS: usize = 2;
    pub const REVIEW: usize = 3;
}

/// Data collected by one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepPayload {
    Provider(CloudProvider),
    Credentials(CloudCredentials),
    Details(AccountDetails),
}

/// Name and description of the new account.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountDetails {
    pub name: String,
    pub description: Option<String>,
}

/// Wizard state for connecting a cloud account.
#[derive(Debug)]
pub struct CloudAccountWizard {
    session: WizardSession<StepPayload>,
    last_error: Option<NetworkError>,
    created: Option<CloudAccount>,
}

impl CloudAccountWizard {
    /// Start a fresh wizard on the Provider step.
    pub fn new() -> std::result::Result<Self, WizardError> {
        let session = WizardSession::new(vec![
            WizardStep::new("Provider").with_subtitle("Choose the cloud to connect"),
            WizardStep::new("Credentials").with_subtitle("Grant read access"),
            WizardStep::new("Details").with_subtitle("Name this account"),
            WizardStep::new("Review"),
        ])?;
        Ok(Self {
            session,
            last_error: None,
            created: None,
        })
    }

    /// The underlying session (steps, statuses, signals).
    pub fn session(&self) -> &WizardSession<StepPayload> {
        &self.session
    }

    /// Error of the last failed submission.
    pub fn last_error(&self) -> Option<&NetworkError> {
        self.last_error.as_ref()
    }

    /// The account created by a successful submission.
    pub fn created(&self) -> Option<&CloudAccount> {
        self.created.as_ref()
    }

    // =========================================================================
    // Step inputs
    // =========================================================================

    /// The chosen provider.
    pub fn provider(&self) -> Option<CloudProvider> {
        match self.session.step_data(steps::PROVIDER) {
            Some(StepPayload::Provider(p)) => Some(*p),
            _ => None,
        }
    }

    /// Choose the provider.
    ///
    /// Stored credentials are re-checked against the new provider: they
    /// count as complete again once they match and validate.
    pub fn set_provider(&mut self, provider: CloudProvider) -> Result<()> {
        self.session
            .update_step_data(steps::PROVIDER, StepPayload::Provider(provider))?;
        self.session.set_step_complete(steps::PROVIDER, true)?;

        if let Some(StepPayload::Credentials(creds)) = self.session.step_data(steps::CREDENTIALS) {
            let usable = creds.provider() == provider && creds.validate().is_valid();
            self.session.set_step_complete(steps::CREDENTIALS, usable)?;
        }
        self.refresh_review()
    }

    /// Enter credentials; the step completes when they validate and match
    /// the chosen provider.
    pub fn set_credentials(&mut self, credentials: CloudCredentials) -> Result<ValidationResult> {
        let mut result = credentials.validate();
        if self.provider() != Some(credentials.provider()) {
            result.add_error(crate::validation::ValidationError::with_field(
                "provider",
                "Credentials do not match the selected provider",
            ));
        }
        self.session
            .update_step_data(steps::CREDENTIALS, StepPayload::Credentials(credentials))?;
        self.session
            .set_step_complete(steps::CREDENTIALS, result.is_valid())?;
        self.refresh_review()?;
        Ok(result)
    }

    /// Paste a GCP service-account key.
    pub fn set_gcp_key(&mut self, blob: &str) -> Result<ValidationResult> {
        match GcpCredentials::from_json_blob(blob) {
            Ok(creds) => self.set_credentials(creds.into()),
            Err(result) => {
                self.session.set_step_complete(steps::CREDENTIALS, false)?;
                self.refresh_review()?;
                Ok(result)
            }
        }
    }

    /// Enter the account name and description.
    pub fn set_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<ValidationResult> {
        let details = AccountDetails {
            name: name.into().trim().to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        let result = Validator::required("name", &details.name);
        self.session
            .update_step_data(steps::DETAILS, StepPayload::Details(details))?;
        self.session
            .set_step_complete(steps::DETAILS, result.is_valid())?;
        self.refresh_review()?;
        Ok(result)
    }

    /// The request `finish` would send, if every step is filled in and valid.
    pub fn build_request(&self) -> Option<NewCloudAccount> {
        let provider = self.provider()?;
        let Some(StepPayload::Credentials(credentials)) =
            self.session.step_data(steps::CREDENTIALS)
        else {
            return None;
        };
        let Some(StepPayload::Details(details)) = self.session.step_data(steps::DETAILS) else {
            return None;
        };
        let all_complete = (0..steps::REVIEW).all(|i| self.session.is_step_complete(i));
        if !all_complete || credentials.provider() != provider {
            return None;
        }
        Some(NewCloudAccount {
            name: details.name.clone(),
            description: details.description.clone(),
            credentials: credentials.clone(),
        })
    }

    fn refresh_review(&mut self) -> Result<()> {
        let ready = self.build_request().is_some();
        self.session.set_step_complete(steps::REVIEW, ready)?;
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Advance to the next step. On Review use [`finish`](Self::finish).
    pub fn next(&mut self) -> NavigationOutcome {
        if self.session.is_last_step() {
            return NavigationOutcome::Blocked;
        }
        self.session.go_next()
    }

    /// Go back one step.
    pub fn back(&mut self) -> bool {
        self.session.go_previous()
    }

    /// Jump back to a visited step.
    pub fn jump_to(&mut self, index: usize) -> bool {
        self.session.jump_to(index)
    }

    /// Submit the account from the Review step.
    ///
    /// On success the account is added to `store` and a success toast is
    /// published. On failure the error is kept in
    /// [`last_error`](Self::last_error), an error toast is published and the
    /// wizard stays on Review so the user can retry.
    pub async fn finish(
        &mut self,
        api: &ConsoleApi,
        store: &AppStore,
        notifications: &NotificationBus,
    ) -> Result<CloudAccount> {
        if !self.session.is_last_step() {
            return Err(Error::Invalid(ValidationResult::invalid(
                "Review the account before finishing",
            )));
        }
        let Some(request) = self.build_request() else {
            return Err(Error::Invalid(ValidationResult::invalid(
                "Complete every step before finishing",
            )));
        };
        if self.session.go_next() != NavigationOutcome::Completed {
            return Err(Error::Invalid(ValidationResult::invalid(
                "Complete every step before finishing",
            )));
        }

        self.last_error = None;
        match api.create_cloud_account(&request).await {
            Ok(account) => {
                tracing::info!(target: targets::WIZARD, id = %account.id, "cloud account created");
                store.upsert_cloud_account(account.clone());
                notifications.success(format!("Cloud account \"{}\" connected", account.name));
                self.created = Some(account.clone());
                Ok(account)
            }
            Err(err) => {
                tracing::warn!(target: targets::WIZARD, "cloud account creation failed: {err}");
                notifications.network_error(&err);
                self.last_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    /// Start over on the Provider step.
    pub fn reset(&mut self) {
        self.session.reset();
        self.last_error = None;
        self.created = None;
    }
}
