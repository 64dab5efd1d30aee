//! Credential store error types.

use thiserror::Error;

/// Errors that can occur while reading or writing stored credentials.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid credential document.
    #[error("Corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No location could be determined for the backing file.
    #[error("No credential directory available on this platform")]
    NoDirectory,
}
