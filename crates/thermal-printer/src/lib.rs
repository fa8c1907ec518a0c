//! Thermal Printer Connection Library
//!
//! This crate drives a Bluetooth-paired thermal receipt printer over its
//! virtual serial port. It provides:
//!
//! - **PrinterConnection**: connect/disconnect lifecycle and print primitives
//! - **PrinterSession**: scoped use that always releases the port
//! - **PrinterConfig**: JSON-backed connection settings
//! - **VirtualPrinter**: an in-memory printer for tests and dry runs
//!
//! # Example
//!
//! ```rust,no_run
//! use thermal_printer::{PrinterConfig, PrinterConnection};
//!
//! let mut printer = PrinterConnection::new(PrinterConfig::default());
//! let mut session = printer.session().unwrap();
//!
//! if session.is_connected() {
//!     session.print_line("Hello from a thermal printer!");
//!     session.feed_lines(2);
//! }
//! ```

pub mod config;
pub mod connection;
pub mod encoding;
pub mod error;
pub mod sim;
pub mod transport;

pub use config::{PrinterConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS};
pub use connection::{Payload, PrinterConnection, PrinterSession};
pub use encoding::TextEncoding;
pub use error::PrinterError;
pub use sim::VirtualPrinter;
pub use transport::{PortHandle, PortOpener, SerialOpener};
