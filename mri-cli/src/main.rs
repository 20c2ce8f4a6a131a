//! MRI CLI - extract banks, properties and units from the MRI API

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{banks, config, extract, properties, units};

/// MRI - property-management data extraction
#[derive(Parser)]
#[command(name = "mri", version, about, long_about = None)]
struct Cli {
    /// Settings file to use instead of <MRI_DIR>/settings.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extraction: banks, properties and units
    Extract {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List banks
    Banks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List properties with their banks
    Properties {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List units of the given properties
    Units {
        /// Property IDs
        #[arg(required = true)]
        property_ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration, secrets masked
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_tracing(cli.log_file.as_deref()).and_then(|()| run(cli));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `info` default
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract { json } => extract::run(config_path, json),
        Commands::Banks { json } => banks::run(config_path, json),
        Commands::Properties { json } => properties::run(config_path, json),
        Commands::Units { property_ids, json } => units::run(config_path, &property_ids, json),
        Commands::Config => config::run(config_path),
    }
}
