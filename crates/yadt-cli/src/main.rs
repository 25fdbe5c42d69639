//! yadt CLI
//!
//! Watch a stream of resource snapshots and print what changed

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "yadt")]
#[command(about = "yadt - Yet Another Diff Tool for live resource changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Diff resources as their snapshots arrive
    Watch(commands::watch::WatchArgs),
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => commands::watch::execute(args),
        Commands::Version => commands::version::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
