//! Core error types for tripcheck.
//!
//! This module defines the shared error type used by the core crate and the
//! assertion failure that the duration verifier and the flow script raise.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum TripcheckError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An observed value did not match the expectation
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    /// Validation errors (invalid input, broken invariants)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// A semantic check failed.
///
/// The message carries the actual and expected values and is what the
/// harness reports for a failed scenario. It is never recovered from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("assertion failed: {message}")]
pub struct AssertionFailure {
    /// Human-readable diagnostic
    pub message: String,
}

impl AssertionFailure {
    /// Create a new assertion failure with the given diagnostic.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fail with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> std::result::Result<(), AssertionFailure> {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailure::new(message()))
    }
}

/// Result type alias using `TripcheckError`.
pub type Result<T> = std::result::Result<T, TripcheckError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
