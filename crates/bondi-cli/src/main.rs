//! Bondifuzz CLI - command line client for the Bondifuzz fuzzing platform.
//!
//! Every command that talks to the API server goes through an
//! auto-authenticating client: it logs in on demand and keeps the session
//! between runs, so users only ever configure their credentials once.

mod cli;
mod commands;
mod output;

use std::io;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Verbosity};
use output::Output;

/// Initialize the tracing subscriber for logging
fn init_tracing(verbosity: Verbosity) {
    // RUST_LOG wins over --verbosity when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let output = Output::new(cli.output_mode);
    if let Err(e) = commands::run(cli.command, output, cli.auto_approve).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
