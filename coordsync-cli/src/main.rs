//! coordsync CLI - Command-line interface
//!
//! One-shot conversions, an interactive coordinate widget, and
//! configuration management on top of the coordsync library.

mod commands;
mod error;
mod runner;
mod session;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::convert::ConvertArgs;
use error::CliError;
use session::SessionArgs;

#[derive(Parser)]
#[command(name = "coordsync")]
#[command(version, about = "Keep geographic and projected coordinates in sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one coordinate pair through the transformation service
    Convert(ConvertArgs),

    /// Run the interactive map + lon/lat + east/north widget
    Session(SessionArgs),

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Session(args) => session::run(args),
        Commands::Config { command } => commands::config::run(command),
    }
}
