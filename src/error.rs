//! Custom error types for unseal
//!
//! This module defines the error hierarchy for the crate using thiserror.
//! Key and integrity failures deliberately share a single message so that a
//! caller printing the error cannot tell a wrong key from a tampered token.

use thiserror::Error;

/// Message shared by every failure that happens after the envelope parsed
const DECRYPTION_FAILED: &str = "Decryption failed";

/// The main error type for unseal operations
#[derive(Error, Debug)]
pub enum UnsealError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// The envelope does not have the five-segment base64url shape, or its
    /// protected header is not a JSON object
    #[error("Malformed envelope: {0}")]
    Parse(String),

    /// The header declares an algorithm or feature this crate does not handle
    #[error("Unsupported algorithm: {0}")]
    Unsupported(String),

    /// Sealing a payload failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Key length does not fit the declared algorithm, or unwrapping failed
    #[error("{}", DECRYPTION_FAILED)]
    Key,

    /// Authentication tag verification failed
    #[error("{}", DECRYPTION_FAILED)]
    Integrity,

    /// The decrypted payload or the carrier header has the wrong shape
    #[error("Invalid claims: {0}")]
    Claims(String),

    /// The inner registration token failed verification
    #[error("Registration token rejected: {0}")]
    Verification(String),
}

impl UnsealError {
    /// Check if this error rejected the token after it was parsed
    ///
    /// True for both key and integrity failures, which callers must treat the
    /// same way.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Key | Self::Integrity)
    }

    /// Check if this is a structural error in the envelope
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<std::io::Error> for UnsealError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UnsealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for unseal operations
pub type UnsealResult<T> = Result<T, UnsealError>;
