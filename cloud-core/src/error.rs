//! Configuration error types.
//!
//! Raised while building configuration value objects, before any I/O happens.

use thiserror::Error;

/// Errors that can occur when reading or validating configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("The value '{value}' is not valid.")]
    Invalid { value: String },

    #[error("Configuration key '{key}' is not set")]
    Missing { key: String },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
