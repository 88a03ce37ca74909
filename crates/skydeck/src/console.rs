//! The console root.
//!
//! [`Console`] owns everything with application lifetime: configuration,
//! the backend client, the bearer token store, the shared [`AppStore`] and
//! the [`NotificationBus`]. Views and forms borrow from it; wizards and
//! forms are created through it so they share the same client.

use std::sync::Arc;

use skydeck_core::logging::{self, targets};
use skydeck_net::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::api::ConsoleApi;
use crate::cloud_account_wizard::CloudAccountWizard;
use crate::config::ConsoleConfig;
use crate::deployment_space::DeploymentSpaceForm;
use crate::error::Result;
use crate::models::{Application, CloudAccount};
use crate::notifications::NotificationBus;
use crate::query::{Query, QueryState};
use crate::store::AppStore;

/// Application root.
pub struct Console {
    config: ConsoleConfig,
    api: ConsoleApi,
    tokens: Arc<dyn TokenStore>,
    store: AppStore,
    notifications: NotificationBus,
    cloud_accounts: Query<Vec<CloudAccount>>,
    applications: Query<Vec<Application>>,
}

impl Console {
    /// Load the configuration, initialize logging and build the console.
    pub fn load() -> Result<Self> {
        let config = ConsoleConfig::load()?;
        logging::init(&config.log_filter);
        Self::from_config(config)
    }

    /// Build a console from an already loaded configuration.
    ///
    /// The token is kept in a file when a token path is known, in memory
    /// otherwise.
    pub fn from_config(config: ConsoleConfig) -> Result<Self> {
        config.validate()?;
        let tokens: Arc<dyn TokenStore> = match config.resolved_token_path() {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => {
                tracing::warn!(target: targets::AUTH, "no data directory, keeping the token in memory");
                Arc::new(MemoryTokenStore::new())
            }
        };
        Self::with_token_store(config, tokens)
    }

    /// Build a console using `tokens` for the bearer token.
    pub fn with_token_store(config: ConsoleConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ConsoleApi::connect(&config.api_base_url, config.request_timeout(), tokens.clone())?;
        tracing::info!(target: targets::API, base_url = %api.base_url(), "console ready");
        Ok(Self {
            notifications: NotificationBus::new(config.max_visible_notifications),
            config,
            api,
            tokens,
            store: AppStore::new(),
            cloud_accounts: Query::new("cloud_accounts"),
            applications: Query::new("applications"),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn api(&self) -> &ConsoleApi {
        &self.api
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    /// Load state of the cloud-account list.
    pub fn cloud_accounts_query(&self) -> &Query<Vec<CloudAccount>> {
        &self.cloud_accounts
    }

    /// Load state of the application list.
    pub fn applications_query(&self) -> &Query<Vec<Application>> {
        &self.applications
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Whether a bearer token is stored.
    pub fn is_logged_in(&self) -> bool {
        self.tokens.token().is_some()
    }

    /// Store the bearer token used for every following request.
    pub fn login(&self, token: &str) -> Result<()> {
        self.tokens.set_token(token)?;
        tracing::info!(target: targets::AUTH, "logged in");
        Ok(())
    }

    /// Forget the token and everything loaded with it.
    pub fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        self.cloud_accounts.reset();
        self.applications.reset();
        self.store.clear();
        self.notifications.clear();
        tracing::info!(target: targets::AUTH, "logged out");
        Ok(())
    }

    // =========================================================================
    // Data loading
    // =========================================================================

    /// Reload the cloud-account list into the store.
    ///
    /// Failures are published as error toasts and left in the query state.
    pub async fn refresh_cloud_accounts(&self) -> QueryState<Vec<CloudAccount>> {
        let state = self.cloud_accounts.run(self.api.list_cloud_accounts()).await;
        self.absorb(&state, |accounts| {
            self.store.set_cloud_accounts(accounts.clone());
        });
        state
    }

    /// Reload the application list into the store.
    pub async fn refresh_applications(&self) -> QueryState<Vec<Application>> {
        let state = self.applications.run(self.api.list_applications()).await;
        self.absorb(&state, |applications| {
            self.store.set_applications(applications.clone());
        });
        state
    }

    fn absorb<T>(&self, state: &QueryState<T>, on_success: impl FnOnce(&T)) {
        match state {
            QueryState::Success(data) => on_success(data),
            QueryState::Error(err) => {
                self.notifications.network_error(err);
            }
            QueryState::Idle | QueryState::Loading => {}
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// A fresh cloud-account wizard.
    pub fn cloud_account_wizard(&self) -> Result<CloudAccountWizard> {
        Ok(CloudAccountWizard::new()?)
    }

    /// An empty deployment-space form for one environment.
    pub fn deployment_space_form(
        &self,
        application_id: impl Into<String>,
        environment_id: impl Into<String>,
    ) -> DeploymentSpaceForm {
        DeploymentSpaceForm::new(self.api.clone(), application_id, environment_id)
    }

    /// Submit `wizard` with this console's client, store and notifications.
    pub async fn finish_cloud_account_wizard(
        &self,
        wizard: &mut CloudAccountWizard,
    ) -> Result<CloudAccount> {
        wizard.finish(&self.api, &self.store, &self.notifications).await
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .field("logged_in", &self.is_logged_in())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
