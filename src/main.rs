//! Frosting CLI - Incremental build orchestrator for CMake and Conan
//!
//! Entry point for the frosting command-line application.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use frosting::cli::output::display_error;
use frosting::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; -v raises the level, -q silences it.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(cli.log_level().into()),
        )
        .with_target(false)
        .without_time()
        .init();

    let start = Instant::now();
    let result = cli.run().await;
    let elapsed = start.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("{:.3}s", elapsed.as_secs_f64());
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
