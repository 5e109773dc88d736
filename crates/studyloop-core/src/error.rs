//! Core error types for studyloop-core.
//!
//! This module defines the error hierarchy using thiserror. Missing-data
//! conditions (empty content pool, no history for a date) are NOT errors;
//! those paths return empty results. Errors here are reserved for storage,
//! configuration, and unexpected cycle failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A sync-cycle step failed
    #[error("Sync cycle failed during '{step}': {message}")]
    Cycle { step: &'static str, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the state database
    #[error("Failed to open state store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Persisted state is from an incompatible version
    #[error("Unsupported state version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    /// Persisted state blob could not be decoded
    #[error("Corrupt state blob: {0}")]
    CorruptState(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
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

    /// Could not resolve a config directory on this platform
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Validation errors for engine inputs.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A date string could not be parsed
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A time string could not be parsed
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    /// A numeric knob is out of its accepted range
    #[error("Value {value} for '{field}' out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
