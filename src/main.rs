//! Splice CLI
//!
//! Prints the FFmpeg command for a timeline export job.
//!
//! # Usage
//!
//! ```bash
//! splice build --job export.json --output-dir renders
//! splice plan --job export.yaml --json
//! splice validate --job export.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use splice_cli::cli::{commands, Cli, Commands};
use splice_cli::utils::logging::init_logging;
use splice_cli::SpliceConfig;

/// Main entry point for the Splice CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SpliceConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    init_logging(&config.logging);
    match SpliceConfig::config_file(cli.config.as_deref()) {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file, using defaults"),
    }
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Build(args) => {
            info!("Executing build command");
            commands::build(args, &config)?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &config)?;
        }
        Commands::Validate(args) => {
            info!("Executing validate command");
            commands::validate(args, &config)?;
        }
    }

    Ok(())
}
