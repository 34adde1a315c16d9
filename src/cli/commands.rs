//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Extract Shippo addresses, parcels, shipments, transactions and refunds
/// as a stream of SCHEMA, RECORD and STATE messages on stdout
#[derive(Parser, Debug)]
#[command(name = "shippo-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// State file (JSON), read at startup and rewritten at every checkpoint
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Fail on the first schema violation and stop at the first failed entity
    #[arg(long)]
    pub strict: bool,

    /// Print the catalog of streams and their schemas, then exit
    #[arg(short, long)]
    pub discover: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
