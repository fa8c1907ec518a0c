//! Printer connection configuration
//!
//! Stored as JSON at `$XDG_CONFIG_HOME/thermal/printer.json`
//! (falling back to `~/.config/thermal/printer.json`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thermal_detect::{Keyword, ScannerConfig};

use crate::encoding::TextEncoding;
use crate::error::PrinterError;

/// Default serial speed of Netum and most 58mm Bluetooth printers
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read/write timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

const CONFIG_FILE: &str = "printer.json";

/// How to find and talk to the printer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrinterConfig {
    /// Explicit port name; `None` means auto-discovery
    #[serde(default)]
    pub port: Option<String>,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Consult port discovery when no explicit port is set
    #[serde(default = "default_true")]
    pub auto_discover: bool,
    /// Discovered port to try before the ranked order
    #[serde(default)]
    pub preferred_port: Option<String>,
    /// Read/write timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Encoding for text payloads
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Replacement discovery keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<Keyword>>,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            auto_discover: true,
            preferred_port: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            encoding: TextEncoding::default(),
            keywords: None,
        }
    }
}

impl PrinterConfig {
    /// Configuration for an explicit port
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: Some(port.into()),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Scanner settings derived from this configuration
    pub fn scanner_config(&self) -> ScannerConfig {
        let mut config = ScannerConfig::default();
        if let Some(keywords) = &self.keywords {
            config.keywords = keywords.clone();
        }
        config
    }

    /// Get the XDG config directory for thermal
    /// Uses $XDG_CONFIG_HOME/thermal, falls back to ~/.config/thermal
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("thermal"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("thermal"))
    }

    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self, PrinterError> {
        let text = std::fs::read_to_string(path).map_err(|source| PrinterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PrinterError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, PrinterError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), PrinterError> {
        let write_err = |source| PrinterError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| PrinterError::ConfigWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

        std::fs::write(path, json).map_err(write_err)
    }
}
