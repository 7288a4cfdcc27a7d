// ABOUTME: Entry point for cguard — allow-list checks and session helpers for smart contracts.
// ABOUTME: Parses CLI args, installs logging, and hands off to the app.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use contractguard::app::{App, Cli};

fn main() -> anyhow::Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::from_cli(&cli)?;
    let clean = app.run(cli.command, &mut std::io::stdout().lock())?;
    Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
