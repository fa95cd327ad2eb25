#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use store_results::StoreConfig;
use tracing::Level;

mod commands;

use commands::status::StatusArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.store-results/store-results.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the classification and regression tables if missing (default)
    Init,

    /// Show the state of the results database without modifying it
    Status(StatusArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::INFO)
            .init();
    }

    let config = StoreConfig::new(&cli.config)?;

    match cli.command {
        None | Some(Commands::Init) => commands::init::run(&config),
        Some(Commands::Status(args)) => commands::status::run(&config, args),
    }
}
