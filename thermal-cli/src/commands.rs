//! Subcommand implementations

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use thermal_detect::{
    list_available_printers, FixedPorts, PortDescriptor, PortKind, PortScanner, PortSource,
};
use thermal_printer::{PortOpener, PrinterConfig, PrinterConnection, PrinterError, VirtualPrinter};
use tracing::info;

use crate::cli::Commands;

/// Blank lines fed after the test page
const TEST_FEED_LINES: usize = 3;

/// Port name the simulated printer is listed under
pub const SIM_PORT: &str = "SIM0";

/// Virtual printer and port listing for `--simulate`
///
/// The printer is discoverable on [`SIM_PORT`] and also answers on an
/// explicitly configured port.
pub fn simulated_backends(config: &PrinterConfig) -> (VirtualPrinter, FixedPorts) {
    let printer = VirtualPrinter::new([SIM_PORT]);
    if let Some(port) = &config.port {
        printer.accept_port(port.as_str());
    }
    info!(
        "Simulating a printer on {}",
        config.port.as_deref().unwrap_or(SIM_PORT)
    );

    let source = FixedPorts(vec![PortDescriptor::new(
        SIM_PORT,
        "Netum NT-1809D (simulated)",
    )
    .with_kind(PortKind::Bluetooth)]);
    (printer, source)
}

/// Run one subcommand against the given port backends
pub fn run<O: PortOpener, S: PortSource>(
    command: &Commands,
    config: PrinterConfig,
    config_path: Option<&Path>,
    opener: O,
    source: S,
) -> Result<()> {
    match command {
        Commands::List => {
            let scanner = PortScanner::with_source(source).with_config(config.scanner_config());
            let stdout = io::stdout();
            list_available_printers(&scanner, &mut stdout.lock())?;
            Ok(())
        }
        Commands::Test => {
            let mut printer = PrinterConnection::with_backends(config, opener, source);
            test_print(&mut printer)
        }
        Commands::Print { text, feed } => {
            let lines = if text.is_empty() {
                read_stdin_lines()?
            } else {
                text.clone()
            };
            let mut printer = PrinterConnection::with_backends(config, opener, source);
            print_lines(&mut printer, &lines, *feed)
        }
        Commands::Feed { count } => {
            let mut printer = PrinterConnection::with_backends(config, opener, source);
            let mut session = printer.session()?;
            if !session.is_connected() {
                bail!("Failed to connect to printer");
            }
            if !session.feed_lines(*count) {
                bail!("Feed failed");
            }
            Ok(())
        }
        Commands::Config { save } => show_config(&config, config_path, *save),
    }
}

/// Print the connection test page
fn test_print<O: PortOpener, S: PortSource>(printer: &mut PrinterConnection<O, S>) -> Result<()> {
    let mut session = printer.session()?;
    if !session.is_connected() {
        bail!("Failed to connect to printer");
    }

    let port = session.connected_port().unwrap_or("?").to_string();
    let now = chrono::Local::now().naive_local();
    for line in test_page(&port, now) {
        if !session.print_line(&line) {
            bail!("Print failed on {}", port);
        }
    }
    if !session.feed_lines(TEST_FEED_LINES) {
        bail!("Print failed on {}", port);
    }

    println!("Test print sent successfully");
    Ok(())
}

/// Lines of the connection test page
fn test_page(port: &str, at: NaiveDateTime) -> Vec<String> {
    vec![
        "=== Connection Test ===".to_string(),
        format!("Timestamp: {}", at.format("%Y-%m-%d %H:%M:%S")),
        format!("Port: {}", port),
        "Status: Connected successfully!".to_string(),
    ]
}

fn print_lines<O: PortOpener, S: PortSource>(
    printer: &mut PrinterConnection<O, S>,
    lines: &[String],
    feed: usize,
) -> Result<()> {
    let mut session = printer.session()?;
    if !session.is_connected() {
        bail!("Failed to connect to printer");
    }

    for line in lines {
        if !session.print_line(line) {
            bail!("Print failed");
        }
    }
    if !session.feed_lines(feed) {
        bail!("Print failed");
    }

    info!("Printed {} line(s)", lines.len());
    Ok(())
}

fn read_stdin_lines() -> Result<Vec<String>> {
    io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("reading stdin")
}

fn show_config(config: &PrinterConfig, path: Option<&Path>, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    match path {
        Some(path) if save => {
            config.save(path)?;
            println!("Saved to {}", path.display());
        }
        Some(path) => println!("Config: {}", path.display()),
        None if save => return Err(PrinterError::NoConfigDir.into()),
        None => {}
    }
    Ok(())
}

/// Write bytes captured by a simulated printer in readable form
///
/// Printable ASCII and newlines pass through; everything else is shown
/// as `\xNN`.
pub fn dump_output<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    writeln!(out, "--- simulated printer received {} bytes ---", data.len())?;
    let mut text = String::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'\n' => text.push('\n'),
            0x20..=0x7E => text.push(byte as char),
            _ => text.push_str(&format!("\\x{:02X}", byte)),
        }
    }
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out, "--- end ---")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_page_contents() {
        let page = test_page("COM8", at());
        assert_eq!(page[0], "=== Connection Test ===");
        assert_eq!(page[1], "Timestamp: 2024-03-09 14:05:00");
        assert_eq!(page[2], "Port: COM8");
    }

    #[test]
    fn test_print_lines_to_virtual_printer() {
        let printer = VirtualPrinter::new(["COM8"]);
        let source = FixedPorts(vec![PortDescriptor::new("COM8", "Netum NT-1809D")]);
        let mut conn =
            PrinterConnection::with_backends(PrinterConfig::default(), printer.clone(), source);

        print_lines(&mut conn, &["a".to_string(), "b".to_string()], 2).unwrap();

        assert_eq!(printer.output(), b"a\nb\n\n\n");
        assert!(!printer.is_open());
    }

    #[test]
    fn test_print_lines_without_printer_fails() {
        let printer = VirtualPrinter::new(["COM8"]);
        let mut conn = PrinterConnection::with_backends(
            PrinterConfig::default(),
            printer.clone(),
            FixedPorts::default(),
        );

        assert!(print_lines(&mut conn, &["a".to_string()], 0).is_err());
        assert!(printer.output().is_empty());
    }

    #[test]
    fn test_test_print_writes_page() {
        let printer = VirtualPrinter::new(["COM8"]);
        let mut conn = PrinterConnection::with_backends(
            PrinterConfig::for_port("COM8"),
            printer.clone(),
            FixedPorts::default(),
        );

        test_print(&mut conn).unwrap();

        let output = String::from_utf8(printer.output()).unwrap();
        assert!(output.starts_with("=== Connection Test ===\n"));
        assert!(output.contains("Port: COM8\n"));
        assert!(output.ends_with("Status: Connected successfully!\n\n\n\n"));
    }

    #[test]
    fn test_simulated_printer_discovered() {
        let config = PrinterConfig::default();
        let (printer, source) = simulated_backends(&config);
        let mut conn = PrinterConnection::with_backends(config, printer.clone(), source);

        assert!(conn.connect().unwrap());
        assert_eq!(conn.connected_port(), Some(SIM_PORT));
    }

    #[test]
    fn test_simulated_printer_answers_on_configured_port() {
        let config = PrinterConfig::for_port("COM8");
        let (printer, source) = simulated_backends(&config);
        let mut conn = PrinterConnection::with_backends(config, printer.clone(), source);

        print_lines(&mut conn, &["hi".to_string()], 1).unwrap();

        assert_eq!(printer.output(), b"hi\n\n");
        assert_eq!(printer.open_count(), 1);
    }

    #[test]
    fn test_dump_output_escapes() {
        let mut out = Vec::new();
        dump_output(&mut out, b"\x1b@Hi\n\x82").unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "--- simulated printer received 6 bytes ---\n\\x1B@Hi\n\\x82\n--- end ---\n"
        );
    }
}
