//! Airtable CLI
//!
//! Command-line interface for reading and writing Airtable records

use airtable_client::cli::{Cli, Runner};
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await.context("airtable request failed") {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
