//! figport command-line tool.
//!
//! Moves a CarFigures record snapshot into a Ballsdex one through a
//! compressed figport document.
//!
//! Usage:
//!   figport export --snapshot carfigures.json
//!   figport import --snapshot ballsdex.json
//!   figport inspect

mod commands;
mod config;
mod snapshot;

use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::ImportOutcome;
use crate::config::FigportConfig;

/// Export and import collectible-bot records as figport documents.
#[derive(Parser, Debug)]
#[command(name = "figport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (defaults to ./figport.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a CarFigures snapshot into a compressed document
    Export {
        /// JSON snapshot to read records from
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Output path (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clear a Ballsdex snapshot and fill it from a compressed document
    Import {
        /// JSON snapshot to replace
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Document to read (overrides the config file)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the header and section layout of a document
    Inspect {
        /// Document to read (defaults to the import input)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let config = FigportConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Export { snapshot, output } => {
            commands::export(&config.export, &cwd, &snapshot, output.as_deref())?;
        }
        Commands::Import { snapshot, input, yes } => {
            let answers = (!yes).then(|| BufReader::new(std::io::stdin()));
            let outcome = commands::import(&config.import, &cwd, input.as_deref(), &snapshot, answers)?;
            if let ImportOutcome::Canceled(reason) = outcome {
                debug!(?reason, "import canceled");
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Inspect { input } => {
            let input = cwd.join(input.unwrap_or(config.import.input));
            commands::inspect(&input)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
