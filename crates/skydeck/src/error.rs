//! Error types for the console.

use skydeck_net::NetworkError;

use crate::cascade::CascadeError;
use crate::config::ConfigError;
use crate::validation::ValidationResult;
use crate::wizard::WizardError;

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by console operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backend call failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A wizard operation was rejected.
    #[error(transparent)]
    Wizard(#[from] WizardError),

    /// A configurator operation was rejected.
    #[error(transparent)]
    Cascade(#[from] CascadeError),

    /// Local form validation failed; nothing was sent.
    #[error("Validation failed: {0}")]
    Invalid(ValidationResult),
}

impl Error {
    /// Text suitable for an inline error next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(err) | Self::Cascade(CascadeError::Fetch(err)) => err.user_message(),
            Self::Invalid(result) => result
                .first_error_message()
                .unwrap_or("Please check the form")
                .to_string(),
            other => other.to_string(),
        }
    }
}
