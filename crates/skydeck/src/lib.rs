//! Skydeck: client core of a cloud operations console.
//!
//! The crate holds everything a console front end needs besides rendering:
//!
//! - **Wizards**: [`WizardSession`] drives multi-step forms;
//!   [`CloudAccountWizard`] is the "connect a cloud account" flow.
//! - **Cascading configurators**: [`CascadeConfigurator`] walks a chain of
//!   backend-provided option sets, each level keyed by the previous
//!   selection. [`DeploymentSpaceForm`] builds on it.
//! - **Backend API**: [`ConsoleApi`] has one typed method per endpoint.
//! - **State**: [`Query`] tracks loading/error/data, [`AppStore`] caches
//!   shared lists, [`NotificationBus`] publishes toasts.
//! - **Config**: [`ConsoleConfig`] loads `config.toml` plus environment
//!   overrides.
//!
//! ```ignore
//! use skydeck::Console;
//!
//! let console = Console::load()?;
//! console.login(&token)?;
//! console.refresh_cloud_accounts().await;
//!
//! let mut wizard = console.cloud_account_wizard()?;
//! wizard.set_provider(skydeck::CloudProvider::Aws)?;
//! ```

pub mod api;
pub mod cascade;
pub mod cloud_account_wizard;
pub mod config;
pub mod console;
pub mod credentials;
pub mod deployment_space;
mod error;
pub mod models;
pub mod notifications;
pub mod query;
pub mod store;
pub mod validation;
pub mod wizard;

pub use error::{Error, Result};

pub use api::{ConsoleApi, WorkloadKind};
pub use cascade::{CascadeConfigurator, CascadeError, OptionSource, OptionsResponse};
pub use cloud_account_wizard::CloudAccountWizard;
pub use config::{ConfigError, ConsoleConfig};
pub use console::Console;
pub use credentials::{AwsCredentials, AzureCredentials, CloudCredentials, GcpCredentials};
pub use deployment_space::DeploymentSpaceForm;
pub use models::{CloudAccount, CloudProvider};
pub use notifications::{NotificationBus, Toast, ToastLevel};
pub use query::{Query, QueryState};
pub use store::AppStore;
pub use validation::{ValidationResult, Validator};
pub use wizard::{NavigationOutcome, StepStatus, WizardError, WizardSession, WizardStep};
