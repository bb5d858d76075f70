//! `clean` command
//!
//! Removes the build directory, including the fingerprint store and tool
//! logs. The settings file is left untouched.

use anyhow::{Context, Result};

use crate::cli::{output, Cli};
use crate::core::paths::ProjectPaths;
use crate::infra::filesystem::remove_dir_all_quiet;

pub async fn execute(cli: &Cli) -> Result<()> {
    let source_dir = super::chain::source_dir(cli)?;
    let mut settings = super::chain::load_settings(cli, &source_dir)?;
    let build_dir = super::chain::resolve_build_dir(cli, &mut settings)?;
    let paths = ProjectPaths::new(source_dir, &build_dir);

    remove_dir_all_quiet(&paths.build_dir)
        .with_context(|| format!("Failed to remove '{}'", paths.build_dir.display()))?;

    if !cli.quiet {
        println!(
            "{} removed {}",
            output::status::SUCCESS,
            paths.build_dir.display()
        );
    }
    Ok(())
}
