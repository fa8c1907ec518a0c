//! Printer connection
//!
//! A [`PrinterConnection`] owns at most one open port handle. It is either
//! disconnected or connected; print calls on a disconnected printer return
//! `false` without touching any port, and a failed write drops the handle so
//! the next call fails fast instead of hanging on a dead link.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use thermal_detect::{Candidate, DetectError, PortScanner, PortSource, SystemPorts};
use tracing::{debug, info, warn};

use crate::config::PrinterConfig;
use crate::transport::{PortHandle, PortOpener, SerialOpener};

/// Newlines written per call when feeding paper
const FEED_CHUNK: usize = 256;

/// Data accepted by [`PrinterConnection::print_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Encoded with the configured text encoding
    Text(&'a str),
    /// Sent verbatim
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

enum LinkState {
    Disconnected,
    Connected { port: String, handle: PortHandle },
}

/// Connection to a single thermal printer
pub struct PrinterConnection<O = SerialOpener, S = SystemPorts> {
    config: PrinterConfig,
    opener: O,
    scanner: PortScanner<S>,
    link: LinkState,
}

impl PrinterConnection {
    /// Connection over the OS serial ports
    pub fn new(config: PrinterConfig) -> Self {
        Self::with_backends(config, SerialOpener, SystemPorts)
    }
}

impl<O: PortOpener, S: PortSource> PrinterConnection<O, S> {
    /// Connection over custom port opener and port source
    pub fn with_backends(config: PrinterConfig, opener: O, source: S) -> Self {
        let scanner = PortScanner::with_source(source).with_config(config.scanner_config());
        Self {
            config,
            opener,
            scanner,
            link: LinkState::Disconnected,
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, LinkState::Connected { .. })
    }

    /// Port name of the open handle
    pub fn connected_port(&self) -> Option<&str> {
        match &self.link {
            LinkState::Connected { port, .. } => Some(port),
            LinkState::Disconnected => None,
        }
    }

    /// Open the printer port
    ///
    /// An explicit port is tried alone and never falls back to discovery.
    /// Otherwise discovered candidates are tried in ranked order until one
    /// opens. Returns `Ok(false)` when nothing opened; only a failure to
    /// enumerate ports is an error.
    pub fn connect(&mut self) -> Result<bool, DetectError> {
        if let LinkState::Connected { port, .. } = &self.link {
            debug!("Already connected to printer on {}", port);
            return Ok(true);
        }

        if let Some(port) = self.config.port.clone() {
            return Ok(self.try_open(&port));
        }

        if !self.config.auto_discover {
            warn!("No printer port specified and auto-discovery is disabled");
            return Ok(false);
        }

        let candidates = self.ordered_candidates()?;
        if candidates.is_empty() {
            warn!("No Bluetooth printers found. Specify a port manually.");
            return Ok(false);
        }

        for candidate in &candidates {
            info!(
                "Trying {} ({}, {} match)",
                candidate.port(),
                candidate.descriptor.description,
                candidate.tier.label()
            );
            if let Some(addr) = &candidate.bt_address {
                debug!("Bluetooth address: {}", addr);
            }
            if self.try_open(candidate.port()) {
                return Ok(true);
            }
        }

        warn!("None of {} candidate(s) could be opened", candidates.len());
        Ok(false)
    }

    /// Release the port handle, if any
    pub fn disconnect(&mut self) {
        if let LinkState::Connected { port, handle } =
            std::mem::replace(&mut self.link, LinkState::Disconnected)
        {
            drop(handle);
            info!("Disconnected from printer on {}", port);
        }
    }

    /// Write a payload verbatim
    ///
    /// Text is encoded with the configured encoding. Returns `false` when
    /// disconnected or when the write fails; a failed write disconnects.
    pub fn print_text<'a>(&mut self, payload: impl Into<Payload<'a>>) -> bool {
        let encoded;
        let data: &[u8] = match payload.into() {
            Payload::Text(text) => {
                encoded = self.config.encoding.encode(text);
                &encoded
            }
            Payload::Bytes(bytes) => bytes,
        };
        self.send(data)
    }

    /// Write text followed by a newline
    pub fn print_line(&mut self, text: &str) -> bool {
        let mut data = self.config.encoding.encode(text);
        data.push(b'\n');
        self.send(&data)
    }

    /// Feed `count` blank lines
    ///
    /// Newlines go out in fixed-size chunks, so any count is accepted.
    pub fn feed_lines(&mut self, count: usize) -> bool {
        if !self.is_connected() {
            warn!("Not connected to printer");
            return false;
        }

        let chunk = [b'\n'; FEED_CHUNK];
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(FEED_CHUNK);
            if !self.send(&chunk[..n]) {
                return false;
            }
            remaining -= n;
        }
        true
    }

    /// Connect and return a guard that disconnects when dropped
    ///
    /// The guard is returned even when no printer could be opened; check
    /// [`PrinterConnection::is_connected`] on it before printing.
    pub fn session(&mut self) -> Result<PrinterSession<'_, O, S>, DetectError> {
        self.connect()?;
        Ok(PrinterSession { conn: self })
    }

    fn ordered_candidates(&self) -> Result<Vec<Candidate>, DetectError> {
        let mut candidates = self.scanner.discover_candidates()?;
        if let Some(preferred) = &self.config.preferred_port {
            if let Some(pos) = candidates
                .iter()
                .position(|c| c.port() == preferred.as_str())
            {
                let candidate = candidates.remove(pos);
                debug!("Trying preferred port {} first", candidate.port());
                candidates.insert(0, candidate);
            }
        }
        Ok(candidates)
    }

    fn try_open(&mut self, port: &str) -> bool {
        match self
            .opener
            .open(port, self.config.baud_rate, self.config.timeout())
        {
            Ok(handle) => {
                info!(
                    "Connected to printer on {} at {} baud",
                    port, self.config.baud_rate
                );
                self.link = LinkState::Connected {
                    port: port.to_string(),
                    handle,
                };
                true
            }
            Err(e) => {
                warn!("Connection failed: {}", e);
                false
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> bool {
        let LinkState::Connected { port, handle } = &mut self.link else {
            warn!("Not connected to printer");
            return false;
        };

        if data.is_empty() {
            return true;
        }

        let result = handle.write_all(data).and_then(|_| handle.flush());
        match result {
            Ok(()) => {
                debug!("Sent {} bytes to printer on {}", data.len(), port);
                true
            }
            Err(e) => {
                warn!("Print failed on {}: {}", port, e);
                self.disconnect();
                false
            }
        }
    }
}

/// Scoped printer use
///
/// Derefs to the connection; disconnects on drop, including early returns
/// and panics inside the scope.
pub struct PrinterSession<'c, O: PortOpener, S: PortSource> {
    conn: &'c mut PrinterConnection<O, S>,
}

impl<O: PortOpener, S: PortSource> Deref for PrinterSession<'_, O, S> {
    type Target = PrinterConnection<O, S>;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl<O: PortOpener, S: PortSource> DerefMut for PrinterSession<'_, O, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
    }
}

impl<O: PortOpener, S: PortSource> Drop for PrinterSession<'_, O, S> {
    fn drop(&mut self) {
        self.conn.disconnect();
    }
}
