//! Local form-field validation.
//!
//! Form steps validate their fields here and report the outcome to the
//! wizard through `set_step_complete`. Nothing in this module talks to the
//! backend.
//!
//! ```
//! use skydeck::validation::{Validator, ValidationResult};
//!
//! let mut result = ValidationResult::valid();
//! result.merge(Validator::required("name", "  "));
//! assert!(!result.is_valid());
//! assert_eq!(result.first_error_message(), Some("This field is required"));
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// ValidationResult
// ============================================================================

/// The result of validating one or more form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a successful validation result.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![ValidationError::new(message)],
        }
    }

    /// Create a failed validation result with a field-specific error.
    pub fn field_error(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![ValidationError::with_field(field_id, message)],
        }
    }

    /// Create a validation result with multiple errors.
    pub fn with_errors(errors: Vec<ValidationError>) -> Self {
        let valid = errors.is_empty();
        Self { valid, errors }
    }

    /// Check if the validation passed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Get the validation errors.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get the first error message, if any.
    pub fn first_error_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    /// First error reported for `field_id`.
    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_id.as_deref() == Some(field_id))
            .map(|e| e.message.as_str())
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.valid = false;
    }

    /// Merge another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        if !self.errors.is_empty() {
            self.valid = false;
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &error.field_id {
                Some(field) => write!(f, "{field}: {}", error.message)?,
                None => f.write_str(&error.message)?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error with message and optional field identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error message.
    pub message: String,
    /// Optional field identifier for highlighting.
    pub field_id: Option<String>,
}

impl ValidationError {
    /// Create a validation error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_id: None,
        }
    }

    /// Create a validation error with a field identifier.
    pub fn with_field(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_id: Some(field_id.into()),
        }
    }
}

// ============================================================================
// Field validators
// ============================================================================

/// Message used for blank required fields.
pub const REQUIRED_MESSAGE: &str = "This field is required";

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid UUID regex")
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("Invalid resource name regex")
});

/// Stateless field checks that each yield a [`ValidationResult`].
pub struct Validator;

impl Validator {
    /// Non-blank after trimming.
    pub fn required(field_id: &str, value: &str) -> ValidationResult {
        if value.trim().is_empty() {
            ValidationResult::field_error(field_id, REQUIRED_MESSAGE)
        } else {
            ValidationResult::valid()
        }
    }

    /// Matches `pattern` in full. Blank values are left to [`required`](Self::required).
    pub fn pattern(field_id: &str, value: &str, pattern: &Regex, message: &str) -> ValidationResult {
        if value.is_empty() || pattern.is_match(value) {
            ValidationResult::valid()
        } else {
            ValidationResult::field_error(field_id, message)
        }
    }

    /// Exact character length.
    pub fn exact_len(field_id: &str, value: &str, len: usize) -> ValidationResult {
        if value.is_empty() || value.chars().count() == len {
            ValidationResult::valid()
        } else {
            ValidationResult::field_error(field_id, format!("Must be exactly {len} characters"))
        }
    }

    /// A UUID in canonical 8-4-4-4-12 form.
    pub fn uuid(field_id: &str, value: &str) -> ValidationResult {
        Self::pattern(field_id, value, &UUID_RE, "Must be a valid UUID")
    }

    /// A lowercase DNS-label style resource name.
    pub fn resource_name(field_id: &str, value: &str) -> ValidationResult {
        Self::pattern(
            field_id,
            value,
            &NAME_RE,
            "Use lowercase letters, digits and hyphens (max 63 characters)",
        )
    }

    /// Parse a JSON blob, reporting a parse failure as a field error.
    pub fn json_blob(
        field_id: &str,
        value: &str,
    ) -> std::result::Result<serde_json::Value, ValidationResult> {
        serde_json::from_str(value).map_err(|e| {
            ValidationResult::field_error(field_id, format!("Invalid JSON: {e}"))
        })
    }
}
