//! `select` command
//!
//! Records the flavor every later command operates on. Without `--flavor`
//! it reports the current selection.

use anyhow::Result;

use crate::cli::commands::FlavorArgs;
use crate::cli::{output, Cli};
use crate::config::defaults;
use crate::core::flavor::Flavor;

pub async fn execute(cli: &Cli, args: &FlavorArgs) -> Result<()> {
    let source_dir = super::chain::source_dir(cli)?;
    let mut settings = super::chain::load_settings(cli, &source_dir)?;

    // Validate before persisting.
    let chosen = match &args.flavor {
        Some(name) => Some(name.parse::<Flavor>()?),
        None => None,
    };
    let selected = settings
        .resolve_str("selection", chosen.map(Flavor::as_str), defaults::FLAVOR)?
        .parse::<Flavor>()?;
    settings.ensure_member("flavors", selected.as_str())?;

    if !cli.quiet {
        println!("{} flavor: {selected}", output::status::SUCCESS);
    }
    Ok(())
}
