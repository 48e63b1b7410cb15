//! Unified error types for Boxroll

use thiserror::Error;

/// Unified error type for all Boxroll operations
///
/// Every variant is recoverable: the orchestration loop logs the error and
/// returns to searching rather than terminating the session.
#[derive(Error, Debug)]
pub enum BoxrollError {
    // Catalog errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Mod definition not found: {0}")]
    ModNotFound(String),

    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid regex override for {category}: {message}")]
    InvalidRegex { category: String, message: String },

    // Action dispatch errors
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Target lost before action completed")]
    TargetingLost,

    #[error("Action cursor state lost")]
    CursorLost,

    #[error("Host window lost focus")]
    FocusLost,

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using BoxrollError
pub type Result<T> = std::result::Result<T, BoxrollError>;
