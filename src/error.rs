//! Error types for the rest requirement engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that can stop a rest evaluation or engine start-up.
//! None of them are transient: a wrong rest determination has regulatory
//! consequences, so nothing is defaulted or retried inside the engine.

use thiserror::Error;

/// The main error type for the rest requirement engine.
///
/// # Example
///
/// ```
/// use rest_engine::error::EngineError;
///
/// let error = EngineError::UnknownRegime {
///     regime: "FAA".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown rule regime: FAA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A request field was missing, malformed or inconsistent.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that failed validation.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A timezone identifier or offset could not be resolved.
    #[error("Cannot resolve timezone '{timezone}': {message}")]
    TimezoneResolution {
        /// The identifier that failed to resolve.
        timezone: String,
        /// A description of the failure.
        message: String,
    },

    /// The regime identifier is not one the engine knows.
    #[error("Unknown rule regime: {regime}")]
    UnknownRegime {
        /// The identifier that was supplied.
        regime: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A process setting held an unusable value.
    #[error("Invalid setting {key}='{value}': {reason}")]
    InvalidSetting {
        /// The environment key.
        key: String,
        /// The raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
