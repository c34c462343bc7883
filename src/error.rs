//! Unified error types for magscan
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a sensor source
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Error from a session operation
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from sensor sources
#[derive(Error, Debug)]
pub enum SensorError {
    /// No usable magnetometer
    #[error("Magnetometer unavailable: {0}")]
    Unavailable(String),

    /// Failed to read a sensor attribute
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// Malformed sample data
    #[error("Invalid sample on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// subscribe() called twice without unsubscribe()
    #[error("Sample source is already subscribed")]
    AlreadySubscribed,
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Threshold must be finite and at least 1
    #[error("Invalid threshold: {0} (must be at least 1)")]
    InvalidThreshold(f64),

    /// Invalid value provided
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors from session operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Calibration and threshold changes are rejected while paused
    #[error("Scanner is paused")]
    Paused,

    /// Domain validation failed
    #[error("Validation failed: {0}")]
    Domain(#[from] DomainError),

    /// Sensor operation failed
    #[error("Sensor operation failed: {0}")]
    Sensor(#[from] SensorError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
