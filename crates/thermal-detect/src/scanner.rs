//! Serial port scanner
//!
//! This module provides serial port enumeration and candidate ranking.

use serialport::{available_ports, SerialPortType};
use tracing::{debug, info};

use crate::error::DetectError;
use crate::vendors::{best_match, default_keywords, extract_bt_address, Keyword, MatchTier};

/// Hardware class of a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb { vid: u16, pid: u16 },
    Bluetooth,
    Pci,
    Unknown,
}

/// Information about a serial port, fresh from the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Port name (e.g., /dev/rfcomm0, COM8)
    pub port: String,
    /// Human-readable description
    pub description: String,
    /// Hardware / vendor identifier (if the OS reports one)
    pub hwid: Option<String>,
    pub kind: PortKind,
}

impl PortDescriptor {
    /// Descriptor with no hardware id and unknown kind
    pub fn new(port: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            description: description.into(),
            hwid: None,
            kind: PortKind::Unknown,
        }
    }

    pub fn with_hwid(mut self, hwid: impl Into<String>) -> Self {
        self.hwid = Some(hwid.into());
        self
    }

    pub fn with_kind(mut self, kind: PortKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb
                    .product
                    .clone()
                    .or_else(|| usb.manufacturer.clone())
                    .unwrap_or_else(|| "USB serial device".to_string());
                let mut hwid = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
                if let Some(serial) = &usb.serial_number {
                    hwid.push_str(" SER=");
                    hwid.push_str(serial);
                }
                if let Some(manufacturer) = &usb.manufacturer {
                    hwid.push_str(" MFG=");
                    hwid.push_str(manufacturer);
                }
                Self {
                    port: name,
                    description,
                    hwid: Some(hwid),
                    kind: PortKind::Usb {
                        vid: usb.vid,
                        pid: usb.pid,
                    },
                }
            }
            SerialPortType::BluetoothPort => Self {
                port: name,
                description: "Bluetooth serial port".to_string(),
                hwid: None,
                kind: PortKind::Bluetooth,
            },
            SerialPortType::PciPort => Self {
                port: name,
                description: "PCI serial port".to_string(),
                hwid: None,
                kind: PortKind::Pci,
            },
            SerialPortType::Unknown => Self {
                port: name,
                description: "n/a".to_string(),
                hwid: None,
                kind: PortKind::Unknown,
            },
        }
    }
}

/// A port that looks like it could be the printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub descriptor: PortDescriptor,
    pub tier: MatchTier,
    /// Keyword that produced the match
    pub keyword: String,
    /// Remote Bluetooth address, formatted XX:XX:XX:XX:XX:XX
    pub bt_address: Option<String>,
}

impl Candidate {
    pub fn port(&self) -> &str {
        &self.descriptor.port
    }
}

/// Where port listings come from
pub trait PortSource {
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, DetectError>;
}

/// Ports reported by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortSource for SystemPorts {
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, DetectError> {
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;
        Ok(ports
            .into_iter()
            .map(|p| PortDescriptor::from_serialport(p.port_name, &p.port_type))
            .collect())
    }
}

/// A fixed port listing, for simulation and tests
#[derive(Debug, Clone, Default)]
pub struct FixedPorts(pub Vec<PortDescriptor>);

impl PortSource for FixedPorts {
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, DetectError> {
        Ok(self.0.clone())
    }
}

impl<S: PortSource + ?Sized> PortSource for &S {
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, DetectError> {
        (**self).list_ports()
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Keywords in priority order
    pub keywords: Vec<Keyword>,
    /// Skip ports whose name contains any of these patterns
    pub skip_patterns: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            skip_patterns: vec![
                // macOS console pseudo-port, never a printer
                "Bluetooth-Incoming-Port".to_string(),
            ],
        }
    }
}

/// Serial port scanner
pub struct PortScanner<S = SystemPorts> {
    source: S,
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner over the system ports with default configuration
    pub fn new() -> Self {
        Self::with_source(SystemPorts)
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PortSource> PortScanner<S> {
    /// Create a scanner over a custom port source
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            config: ScannerConfig::default(),
        }
    }

    /// Replace the scanner configuration
    pub fn with_config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<PortDescriptor>, DetectError> {
        debug!("Enumerating serial ports...");
        let result: Vec<_> = self
            .source
            .list_ports()?
            .into_iter()
            .filter(|p| !self.should_skip_port(p))
            .collect();

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                debug!("  {} - {}", port.port, port.description);
            }
        }

        Ok(result)
    }

    /// Enumerate ports and rank the ones that look like a printer
    pub fn discover_candidates(&self) -> Result<Vec<Candidate>, DetectError> {
        let ports = self.enumerate_ports()?;
        let candidates = rank_candidates(ports, &self.config.keywords);
        info!("{} printer candidate(s)", candidates.len());
        Ok(candidates)
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &PortDescriptor) -> bool {
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| port.port.contains(pattern.as_str()))
    }
}

/// Discover printer candidates among the system ports
pub fn discover_candidates() -> Result<Vec<Candidate>, DetectError> {
    PortScanner::new().discover_candidates()
}

/// Classify ports against the keyword list and order them by tier
///
/// Non-matching ports are dropped. The sort is stable, so ports keep their
/// enumeration order within a tier.
pub fn rank_candidates(ports: Vec<PortDescriptor>, keywords: &[Keyword]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = ports
        .into_iter()
        .filter_map(|descriptor| {
            let hwid = descriptor.hwid.as_deref().unwrap_or("");
            let hit = best_match(
                keywords,
                &[&descriptor.description, hwid, &descriptor.port],
            )?;
            debug!(
                "{} matched {} keyword {:?}",
                descriptor.port,
                hit.tier.label(),
                hit.text
            );
            let bt_address = descriptor.hwid.as_deref().and_then(extract_bt_address);
            Some(Candidate {
                tier: hit.tier,
                keyword: hit.text.clone(),
                bt_address,
                descriptor,
            })
        })
        .collect();

    candidates.sort_by_key(|c| c.tier);
    candidates
}
