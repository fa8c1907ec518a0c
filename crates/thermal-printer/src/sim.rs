//! Virtual printer
//!
//! An in-memory stand-in for a paired printer. It answers opens for a set of
//! port names, records every byte written through its handles, and can pull
//! the rug out from under an open handle the way a dropped Bluetooth link
//! does. Clones share state, so a test can keep one copy for inspection and
//! hand another to the connection.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::PrinterError;
use crate::transport::{PortHandle, PortOpener};

#[derive(Debug, Default)]
struct VirtualPrinterState {
    /// Port names that open successfully
    ports: HashSet<String>,
    /// Everything written, in order
    output: Vec<u8>,
    /// Port of the currently open handle
    open_port: Option<String>,
    /// Incremented on each open; a handle is live only while it matches
    generation: u64,
    invalidated: bool,
    opens: usize,
    releases: usize,
    baud_rate: Option<u32>,
}

/// A simulated printer reachable through one or more port names
#[derive(Debug, Clone, Default)]
pub struct VirtualPrinter {
    state: Arc<Mutex<VirtualPrinterState>>,
}

impl VirtualPrinter {
    /// Create a printer that answers on the given port names
    pub fn new<I, S>(ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let printer = Self::default();
        printer.lock().ports = ports.into_iter().map(Into::into).collect();
        printer
    }

    fn lock(&self) -> MutexGuard<'_, VirtualPrinterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Accept opens on another port name
    pub fn accept_port(&self, port: impl Into<String>) {
        self.lock().ports.insert(port.into());
    }

    /// Stop accepting opens on a port name
    pub fn reject_port(&self, port: &str) {
        self.lock().ports.remove(port);
    }

    /// Simulate the link dropping: the open handle fails every later write
    pub fn invalidate(&self) {
        let mut state = self.lock();
        if state.open_port.is_some() {
            info!("Virtual printer link invalidated");
            state.invalidated = true;
        }
    }

    /// Bytes received so far
    pub fn output(&self) -> Vec<u8> {
        self.lock().output.clone()
    }

    /// Bytes received so far, clearing the buffer
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().output)
    }

    /// Whether a handle is currently open
    pub fn is_open(&self) -> bool {
        self.lock().open_port.is_some()
    }

    /// Port name of the open handle
    pub fn open_port(&self) -> Option<String> {
        self.lock().open_port.clone()
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    pub fn release_count(&self) -> usize {
        self.lock().releases
    }

    /// Baud rate requested by the most recent open
    pub fn baud_rate(&self) -> Option<u32> {
        self.lock().baud_rate
    }
}

impl PortOpener for VirtualPrinter {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        _timeout: Duration,
    ) -> Result<PortHandle, PrinterError> {
        let mut state = self.lock();
        if !state.ports.contains(port) {
            return Err(PrinterError::OpenFailed {
                port: port.to_string(),
                reason: "no such device".to_string(),
            });
        }
        if state.open_port.is_some() {
            return Err(PrinterError::OpenFailed {
                port: port.to_string(),
                reason: "device busy".to_string(),
            });
        }

        state.generation += 1;
        state.opens += 1;
        state.invalidated = false;
        state.open_port = Some(port.to_string());
        state.baud_rate = Some(baud_rate);
        debug!("Virtual printer opened on {}", port);

        Ok(Box::new(VirtualHandle {
            state: Arc::clone(&self.state),
            generation: state.generation,
        }))
    }
}

/// Write handle onto a [`VirtualPrinter`]
struct VirtualHandle {
    state: Arc<Mutex<VirtualPrinterState>>,
    generation: u64,
}

impl VirtualHandle {
    fn live_state(&self) -> io::Result<MutexGuard<'_, VirtualPrinterState>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.invalidated || state.generation != self.generation {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "virtual printer link dropped",
            ));
        }
        Ok(state)
    }
}

impl Write for VirtualHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.live_state()?;
        state.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.live_state().map(|_| ())
    }
}

impl Drop for VirtualHandle {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation == self.generation {
            state.open_port = None;
            state.invalidated = false;
        }
        state.releases += 1;
    }
}
