//! Thermal Printer CLI
//!
//! Discovers a Bluetooth-paired thermal printer and prints to it.

mod cli;
mod commands;

use std::io;

use anyhow::Result;
use clap::Parser;
use thermal_detect::SystemPorts;
use thermal_printer::SerialOpener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "thermal=info,thermal_detect=info,thermal_printer=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let config_path = cli.config_path();

    if cli.simulate {
        let (printer, source) = commands::simulated_backends(&config);

        let result = commands::run(
            &cli.command,
            config,
            config_path.as_deref(),
            printer.clone(),
            source,
        );

        let output = printer.take_output();
        if !output.is_empty() {
            commands::dump_output(&mut io::stdout().lock(), &output)?;
        }
        return result;
    }

    commands::run(
        &cli.command,
        config,
        config_path.as_deref(),
        SerialOpener,
        SystemPorts,
    )
}
