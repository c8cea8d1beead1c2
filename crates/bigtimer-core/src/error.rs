//! Core error types for bigtimer-core.
//!
//! The timer and routine state machines never fail; invalid transitions are
//! no-ops. Errors come from the storage layer and from parsing user input
//! into routines.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bigtimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (dot-path config access goes through serde_json)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file is not valid TOML for [`crate::Config`]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A step spec such as `10:Brush teeth` could not be parsed
    #[error("Invalid step '{spec}': {message}")]
    InvalidStep { spec: String, message: String },

    #[error("Routine '{0}' has no steps")]
    EmptyRoutine(String),

    #[error("No routine named or with id '{0}'")]
    UnknownRoutine(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
