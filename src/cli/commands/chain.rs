//! Shared driver for the build-chain commands
//!
//! `deps`, `generate`, `build`, `test`, and `install` all follow the same
//! shape: load settings, resolve options (persisting any overrides), then
//! hand the target to the runner and report the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::output::OutputMode;
use crate::cli::{output, Cli};
use crate::config::defaults;
use crate::core::fingerprint::FingerprintStore;
use crate::core::graph::{CommandGraph, CommandId};
use crate::core::options::{OptionOverrides, ResolvedOptions};
use crate::core::paths::ProjectPaths;
use crate::core::runner::Runner;
use crate::core::settings::Settings;
use crate::infra::toolchain::Toolchain;

/// Run `target` and every stale prerequisite.
pub async fn execute(cli: &Cli, target: CommandId, overrides: OptionOverrides) -> Result<()> {
    let source_dir = source_dir(cli)?;
    let mut settings = load_settings(cli, &source_dir)?;

    let build_dir = resolve_build_dir(cli, &mut settings)?;
    let paths = ProjectPaths::new(source_dir, &build_dir);
    paths.ensure_build_dirs()?;

    let opts = ResolvedOptions::resolve(&mut settings, &overrides)?;
    let mode = OutputMode {
        quiet: cli.quiet,
        stream: stream_output(cli, &settings),
    };
    let toolchain = Toolchain::from_settings(&mut settings, mode)?;

    let graph = CommandGraph::new()?;
    let mut store = FingerprintStore::load(&paths.state_file())?;
    let report = Runner::new(&graph, &mut store, &toolchain, &opts, &paths).run(target)?;

    if let Some(failure) = report.failure {
        return Err(failure.into());
    }
    if !cli.quiet {
        if report.all_skipped() {
            println!(
                "{} {} is up to date ({})",
                output::status::SUCCESS,
                target.name(),
                opts.flavor
            );
        } else {
            println!(
                "{} {} finished ({})",
                output::status::SUCCESS,
                target.name(),
                opts.flavor
            );
        }
    }
    Ok(())
}

/// Canonical source directory from `-S`/`--source-dir`
pub fn source_dir(cli: &Cli) -> Result<PathBuf> {
    cli.source_dir.canonicalize().with_context(|| {
        format!(
            "Source directory '{}' not found",
            cli.source_dir.display()
        )
    })
}

/// Load the settings file.
///
/// `--config` may be absolute or relative to the source directory; by
/// default the file is `.frosting.toml` in the source directory.
pub fn load_settings(cli: &Cli, source_dir: &Path) -> Result<Settings> {
    let config = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_FILE));
    let config = if config.is_absolute() {
        config
    } else {
        source_dir.join(config)
    };
    Ok(Settings::load(&config)?)
}

/// Resolve the build directory setting, persisting a `-B` override.
pub fn resolve_build_dir(cli: &Cli, settings: &mut Settings) -> Result<String> {
    Ok(settings.resolve_str("directory", cli.build_dir.as_deref(), defaults::BUILD_DIR)?)
}

/// Whether tool output should stream to the console.
///
/// `-v` raises verbosity for one invocation only; the persisted
/// `verbosity` key raises it for every invocation. `-q` wins over both.
fn stream_output(cli: &Cli, settings: &Settings) -> bool {
    if cli.quiet {
        return false;
    }
    let persisted = settings
        .get_int("verbosity")
        .unwrap_or(i64::from(defaults::VERBOSITY));
    cli.verbose >= 1 || persisted >= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from([&["frosting"], args].concat()).unwrap()
    }

    #[test]
    fn test_config_path_defaults_into_source_dir() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&cli(&["build"]), dir.path()).unwrap();
        assert_eq!(settings.path(), dir.path().join(".frosting.toml"));
    }

    #[test]
    fn test_relative_config_path_resolves_against_source_dir() {
        let dir = TempDir::new().unwrap();
        let settings =
            load_settings(&cli(&["--config", "alt.toml", "build"]), dir.path()).unwrap();
        assert_eq!(settings.path(), dir.path().join("alt.toml"));
    }

    #[test]
    fn test_missing_source_dir_is_an_error() {
        let missing = cli(&["-S", "/definitely/not/a/dir", "build"]);
        assert!(source_dir(&missing).is_err());
    }

    #[test]
    fn test_verbosity_flag_enables_streaming() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join(".frosting.toml")).unwrap();

        assert!(!stream_output(&cli(&["build"]), &settings));
        assert!(stream_output(&cli(&["-v", "build"]), &settings));
        assert!(!stream_output(&cli(&["-v", "-q", "build"]), &settings));
    }

    #[test]
    fn test_persisted_verbosity_enables_streaming() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".frosting.toml");
        std::fs::write(&path, "verbosity = 1\n").unwrap();
        let settings = Settings::load(&path).unwrap();

        assert!(stream_output(&cli(&["build"]), &settings));
        assert!(!stream_output(&cli(&["-q", "build"]), &settings));
    }
}
