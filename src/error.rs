//! Error types for epicstamp operations.
//!
//! This module defines [`EpicstampError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `EpicstampError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `EpicstampError::Other`) for unexpected errors
//! - The variable engine and the in-memory cache never return errors; only
//!   template storage, config loading and the CLI do

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for epicstamp operations.
#[derive(Debug, Error)]
pub enum EpicstampError {
    /// No template with the given id exists in the store.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    /// A template file could not be parsed.
    #[error("Failed to parse template at {path}: {message}")]
    TemplateParseError { path: PathBuf, message: String },

    /// Declared variables have no value in the mapping.
    #[error("Missing values for variables: {}", names.join(", "))]
    MissingVariables { names: Vec<String> },

    /// A story or task index is outside the collection.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A `KEY=VALUE` mapping argument could not be parsed.
    #[error("Invalid variable mapping '{input}', expected KEY=VALUE")]
    InvalidMapping { input: String },

    /// Explicitly requested settings file does not exist.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the settings file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Settings parsed but hold invalid values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for epicstamp operations.
pub type Result<T> = std::result::Result<T, EpicstampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_displays_id() {
        let err = EpicstampError::TemplateNotFound {
            id: "tpl_1_abc".into(),
        };
        assert!(err.to_string().contains("tpl_1_abc"));
    }

    #[test]
    fn template_parse_error_displays_path_and_message() {
        let err = EpicstampError::TemplateParseError {
            path: PathBuf::from("/templates/onboarding.yml"),
            message: "missing field `epic`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/templates/onboarding.yml"));
        assert!(msg.contains("missing field `epic`"));
    }

    #[test]
    fn missing_variables_lists_names() {
        let err = EpicstampError::MissingVariables {
            names: vec!["Feature".into(), "Team".into()],
        };
        assert_eq!(err.to_string(), "Missing values for variables: Feature, Team");
    }

    #[test]
    fn index_out_of_range_displays_bounds() {
        let err = EpicstampError::IndexOutOfRange {
            what: "story",
            index: 4,
            len: 2,
        };
        assert_eq!(err.to_string(), "story index 4 out of range (len 2)");
    }

    #[test]
    fn invalid_mapping_displays_input() {
        let err = EpicstampError::InvalidMapping {
            input: "Feature".into(),
        };
        assert!(err.to_string().contains("'Feature'"));
    }

    #[test]
    fn config_not_found_displays_path() {
        let err = EpicstampError::ConfigNotFound {
            path: PathBuf::from("/etc/epicstamp.yml"),
        };
        assert!(err.to_string().contains("/etc/epicstamp.yml"));
    }

    #[test]
    fn config_validation_error_displays_message() {
        let err = EpicstampError::ConfigValidationError {
            message: "bad ttl".into(),
        };
        assert!(err.to_string().contains("bad ttl"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: EpicstampError = io_err.into();
        assert!(matches!(err, EpicstampError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: EpicstampError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
