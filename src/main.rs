//! Copysmith - quality-controlled marketing copy generation CLI

use anyhow::Result;
use clap::Parser;
use copysmith::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI args first so the log-level flag can seed the filter.
    let cli = cli::Cli::parse();

    // Initialize logging; RUST_LOG wins over the flag.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cli::run(cli)
}
