//! Command-line arguments

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use thermal_printer::{PrinterConfig, TextEncoding};

/// Thermal - Bluetooth thermal printer utility
#[derive(Parser, Debug)]
#[command(name = "thermal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/thermal/printer.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serial port of the printer (skips discovery)
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// Never auto-discover; only use an explicit port
    #[arg(long, global = true)]
    pub no_discover: bool,

    /// Text encoding (cp437, latin1, ascii)
    #[arg(long, global = true)]
    pub encoding: Option<TextEncoding>,

    /// Print to an in-memory printer and dump what it received
    #[arg(long, global = true)]
    pub simulate: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List serial ports that look like a thermal printer
    List,

    /// Print a connection test page
    Test,

    /// Print lines of text (reads stdin when none are given)
    Print {
        /// Lines to print
        text: Vec<String>,

        /// Blank lines to feed afterwards
        #[arg(long, default_value_t = 3)]
        feed: usize,
    },

    /// Feed blank lines
    Feed {
        /// Number of lines
        count: usize,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    /// Config file path in effect
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(PrinterConfig::default_path)
    }

    /// Load the config file and apply command-line overrides
    pub fn resolve_config(&self) -> Result<PrinterConfig> {
        let mut config = match self.config_path() {
            Some(path) => PrinterConfig::load_or_default(&path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PrinterConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut PrinterConfig) {
        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if self.no_discover {
            config.auto_discover = false;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
    }
}
