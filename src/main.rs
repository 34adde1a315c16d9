//! Shippo sync CLI
//!
//! Command-line interface for extracting Shippo collections

use clap::Parser;
use shippo_sync::cli::{Cli, Runner};
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout carries the message stream
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    let runner = Runner::new(cli);
    match runner.run(shutdown_rx).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
