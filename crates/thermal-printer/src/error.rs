//! Error types for the printer connection

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening a printer or handling its configuration
#[derive(Debug, Error)]
pub enum PrinterError {
    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Config file could not be written
    #[error("failed to write config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No home or XDG config directory could be determined
    #[error("could not determine config directory")]
    NoConfigDir,
}
