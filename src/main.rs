mod bronze;
mod cleaner;
mod cli;
mod db;
mod error;
mod flatten;
mod fmt;
mod logging;
mod metadata;
mod models;
mod pipeline;
mod schema;
mod settings;
mod writer;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { data_dir, no_load } => cli::run::run(data_dir.as_deref(), no_load),
        Commands::Status { data_dir, limit } => cli::status::run(data_dir.as_deref(), limit),
        Commands::Use { path } => cli::use_dir::run(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
