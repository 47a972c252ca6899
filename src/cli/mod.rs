pub mod run;
pub mod status;
pub mod use_dir;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bankflow", about = "Flatten and clean bronze bank payloads into the silver layer.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process the latest bronze payload into silver CSVs and the warehouse.
    Run {
        /// Data directory (default: the saved one, or ~/Documents/bankflow)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Write silver files only; skip the warehouse load
        #[arg(long = "no-load")]
        no_load: bool,
    },
    /// Show the data directory, latest bronze file and recent runs.
    Status {
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Number of recent runs to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Save a data directory as the default.
    Use {
        /// Path to a data directory
        path: String,
    },
}
