//! Serial transport seam
//!
//! The connection never talks to `serialport` directly; it asks a
//! [`PortOpener`] for a write handle. [`SerialOpener`] is the real one.

use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::debug;

use crate::error::PrinterError;

/// An open, exclusively owned byte sink to the printer
pub type PortHandle = Box<dyn Write + Send>;

/// Opens printer ports
pub trait PortOpener {
    fn open(&self, port: &str, baud_rate: u32, timeout: Duration)
        -> Result<PortHandle, PrinterError>;
}

impl<O: PortOpener + ?Sized> PortOpener for &O {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<PortHandle, PrinterError> {
        (**self).open(port, baud_rate, timeout)
    }
}

/// Opens OS serial ports, 8N1 without flow control
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<PortHandle, PrinterError> {
        debug!("Opening {} at {} baud", port, baud_rate);
        let handle = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| PrinterError::OpenFailed {
                port: port.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(handle))
    }
}
