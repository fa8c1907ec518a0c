//! Error types for printer port discovery

use thiserror::Error;

/// Errors that can occur during discovery
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Failed to write the human-readable candidate report
    #[error("failed to write port report: {0}")]
    Report(#[from] std::io::Error),
}
