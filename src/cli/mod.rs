//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`]
//! module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use self::commands::Commands;

/// Frosting - incremental build orchestrator for CMake and Conan
///
/// Runs the chain of steps a command needs (dependency resolution,
/// build-file generation, compilation, testing, installation) and skips
/// every step whose inputs are unchanged since its last successful run.
#[derive(Parser, Debug)]
#[command(name = "frosting")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Source directory, absolute or relative to the current directory
    #[arg(short = 'S', long, global = true, default_value = ".", value_name = "PATH")]
    pub source_dir: PathBuf,

    /// Configuration file, absolute or relative to the source directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build directory, absolute or relative to the source directory
    #[arg(short = 'B', long, global = true, value_name = "PATH")]
    pub build_dir: Option<String>,

    /// Enable verbose output (-v streams tool output, -vv adds debug logs)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Tracing level implied by the verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = &self.command {
            cmd.clone().run(&self).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
