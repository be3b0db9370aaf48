//! Error types for SnapKV
//!
//! Provides a unified error type for all collection operations.

use thiserror::Error;

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

/// Unified error type for SnapKV operations
#[derive(Debug, Error)]
pub enum SnapError {
    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Key {0} does not exist")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

// Codecs only ever see in-memory buffers, so every bincode failure
// (including a short read on a truncated item) is an encoding failure.
impl From<bincode::Error> for SnapError {
    fn from(err: bincode::Error) -> Self {
        SnapError::Encoding(err.to_string())
    }
}
