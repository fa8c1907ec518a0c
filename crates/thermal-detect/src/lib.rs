//! Thermal Printer Port Detection Library
//!
//! This crate enumerates serial ports and picks out the ones that are likely
//! to be a Bluetooth-paired thermal receipt printer.
//!
//! # Example
//!
//! ```rust,no_run
//! use thermal_detect::PortScanner;
//!
//! let scanner = PortScanner::new();
//! let candidates = scanner.discover_candidates().unwrap();
//!
//! for candidate in candidates {
//!     println!("Found printer candidate: {}", candidate.port());
//! }
//! ```

pub mod error;
pub mod report;
pub mod scanner;
pub mod vendors;

pub use error::DetectError;
pub use report::{list_available_printers, write_report};
pub use scanner::{
    discover_candidates, rank_candidates, Candidate, FixedPorts, PortDescriptor, PortKind,
    PortScanner, PortSource, ScannerConfig, SystemPorts,
};
pub use vendors::{default_keywords, Keyword, MatchTier, DEFAULT_KEYWORDS};
