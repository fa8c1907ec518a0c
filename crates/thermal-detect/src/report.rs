//! Human-readable candidate listing

use std::io::Write;

use crate::error::DetectError;
use crate::scanner::{Candidate, PortScanner, PortSource};

/// Write the ranked candidate list, or troubleshooting hints when it is empty
pub fn write_report<W: Write>(out: &mut W, candidates: &[Candidate]) -> std::io::Result<()> {
    writeln!(out, "=== Available Thermal Printers ===")?;

    if candidates.is_empty() {
        writeln!(out, "No Bluetooth printers found.")?;
        writeln!(out)?;
        writeln!(out, "Troubleshooting:")?;
        writeln!(out, "1. Make sure the printer is powered on")?;
        writeln!(out, "2. Pair the printer in the system Bluetooth settings")?;
        writeln!(
            out,
            "3. Ensure the printer is connected (not just paired) and bound to a serial port"
        )?;
        return Ok(());
    }

    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(out, "{}. Port: {}", i + 1, candidate.port())?;
        writeln!(out, "   Description: {}", candidate.descriptor.description)?;
        writeln!(
            out,
            "   Match: {} ({})",
            candidate.tier.label(),
            candidate.keyword
        )?;
        if let Some(addr) = &candidate.bt_address {
            writeln!(out, "   Bluetooth Address: {}", addr)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Discover candidates and print them to `out`
///
/// Returns the same ranked list that was printed.
pub fn list_available_printers<S: PortSource, W: Write>(
    scanner: &PortScanner<S>,
    out: &mut W,
) -> Result<Vec<Candidate>, DetectError> {
    let candidates = scanner.discover_candidates()?;
    write_report(out, &candidates)?;
    Ok(candidates)
}
