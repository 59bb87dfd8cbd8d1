//! `oemctl`: client for the OEM requirements chaincode.
//!
//! Startup:
//! 1. Parse flags
//! 2. Resolve configuration (file, then `OEM_*`, then flags)
//! 3. Install logging
//! 4. Run the command and map any failure to an exit code

use clap::Parser;
use client_runtime::config::RuntimeConfig;
use client_runtime::{commands, exit, logging, Cli};
use fc_01_identity::exit_codes;
use std::process::ExitCode;
use tracing::error;

fn code(value: i32) -> ExitCode {
    ExitCode::from(u8::try_from(value).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RuntimeConfig::resolve(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("oemctl: {e}");
            return code(exit_codes::CONFIGURATION);
        }
    };

    if let Err(e) = logging::init(&config.log) {
        eprintln!("oemctl: {e}");
        return code(exit_codes::CONFIGURATION);
    }

    match commands::run(cli.command, config).await {
        Ok(()) => code(exit::SUCCESS),
        Err(e) => {
            let status = exit::exit_code(&e);
            error!(exit_code = status, error = %e, "Command failed");
            eprintln!("oemctl: {e:#}");
            code(status)
        }
    }
}
