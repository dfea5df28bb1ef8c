//! CLI module for Splice
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SpliceConfig;
use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

/// Splice - timeline export command builder
///
/// Turns an editor's timeline job description into the FFmpeg argument list
/// that renders it. FFmpeg itself is never run.
#[derive(Parser, Debug)]
#[command(name = "splice")]
#[command(about = "Build FFmpeg commands from timeline export jobs")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overrides SPLICE_LOG_LEVEL and the config file)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Configuration file (default: ./splice.toml when present)
    #[arg(long, env = "SPLICE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply the command-line layer on top of file and environment settings
    pub fn apply_overrides(&self, config: &mut SpliceConfig) {
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Commands::Build(args) = &self.command {
            if let Some(dir) = &args.output_dir {
                config.output_dir = Some(dir.clone());
            }
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the FFmpeg arguments for a job
    Build(args::BuildArgs),
    /// Print the gap-processed timeline of a job
    Plan(args::PlanArgs),
    /// Check a job without printing a command
    Validate(args::ValidateArgs),
}
