//! CLI command implementations
//!
//! Each command is implemented in its own submodule. A command accepts
//! its own flags plus the flags of every transitive prerequisite, built
//! statically from the flattened argument groups below.

pub mod chain;
pub mod clean;
pub mod select;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Cli;
use crate::core::graph::CommandId;
use crate::core::options::OptionOverrides;

/// Flavor selection, shared by the whole build chain
#[derive(Args, Debug, Clone, Default)]
pub struct FlavorArgs {
    /// Build flavor (release or debug, case-insensitive)
    #[arg(long, value_name = "NAME")]
    pub flavor: Option<String>,
}

/// Flags of the `deps` command
#[derive(Args, Debug, Clone, Default)]
pub struct DepsArgs {
    /// Conan profile name
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Set a Conan option; repeatable
    #[arg(short = 'o', long = "option", value_name = "NAME[=VALUE]")]
    pub options: Vec<String>,
}

/// Flags of the `generate` command
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// CMake generator name
    #[arg(short = 'G', long, value_name = "NAME")]
    pub generator: Option<String>,

    /// Build shared libraries
    #[arg(long)]
    pub shared: bool,

    /// Build static libraries
    #[arg(long, conflicts_with = "shared")]
    pub no_shared: bool,

    /// Include tests
    #[arg(long)]
    pub tests: bool,

    /// Exclude tests
    #[arg(long, conflicts_with = "tests")]
    pub no_tests: bool,

    /// Set a CMake variable; repeatable
    #[arg(short = 'D', long = "variable", value_name = "NAME[=VALUE]")]
    pub variables: Vec<String>,

    /// Unset a CMake variable; repeatable
    #[arg(short = 'U', long = "unvariable", value_name = "NAME")]
    pub unvariables: Vec<String>,

    /// Prefix at which to install this package
    #[arg(long, value_name = "PATH")]
    pub prefix: Option<String>,
}

/// Flags of the `build` command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Maximum number of simultaneous jobs
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Build a single target instead of everything
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Select a flavor
    Select {
        #[command(flatten)]
        flavor: FlavorArgs,
    },

    /// Resolve dependencies with the package manager
    Deps {
        #[command(flatten)]
        flavor: FlavorArgs,

        #[command(flatten)]
        deps: DepsArgs,
    },

    /// Generate build files for the selected flavor
    Generate {
        #[command(flatten)]
        flavor: FlavorArgs,

        #[command(flatten)]
        deps: DepsArgs,

        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Build the selected flavor
    Build {
        #[command(flatten)]
        flavor: FlavorArgs,

        #[command(flatten)]
        deps: DepsArgs,

        #[command(flatten)]
        generate: GenerateArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Test the selected flavor
    Test {
        #[command(flatten)]
        flavor: FlavorArgs,

        #[command(flatten)]
        deps: DepsArgs,

        #[command(flatten)]
        generate: GenerateArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Install the selected flavor
    Install {
        #[command(flatten)]
        flavor: FlavorArgs,

        #[command(flatten)]
        deps: DepsArgs,

        #[command(flatten)]
        generate: GenerateArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Remove the build directory, including all recorded state
    Clean,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, cli: &Cli) -> Result<()> {
        match self {
            Self::Select { flavor } => select::execute(cli, &flavor).await,
            Self::Deps { flavor, deps } => {
                let overrides = merge(&flavor, Some(&deps), None, None);
                chain::execute(cli, CommandId::Deps, overrides).await
            }
            Self::Generate {
                flavor,
                deps,
                generate,
            } => {
                let overrides = merge(&flavor, Some(&deps), Some(&generate), None);
                chain::execute(cli, CommandId::Generate, overrides).await
            }
            Self::Build {
                flavor,
                deps,
                generate,
                build,
            } => {
                let overrides = merge(&flavor, Some(&deps), Some(&generate), Some(&build));
                chain::execute(cli, CommandId::Build, overrides).await
            }
            Self::Test {
                flavor,
                deps,
                generate,
                build,
            } => {
                let overrides = merge(&flavor, Some(&deps), Some(&generate), Some(&build));
                chain::execute(cli, CommandId::Test, overrides).await
            }
            Self::Install {
                flavor,
                deps,
                generate,
                build,
            } => {
                let overrides = merge(&flavor, Some(&deps), Some(&generate), Some(&build));
                chain::execute(cli, CommandId::Install, overrides).await
            }
            Self::Clean => clean::execute(cli).await,
        }
    }
}

/// Fold the flattened argument groups into option overrides.
fn merge(
    flavor: &FlavorArgs,
    deps: Option<&DepsArgs>,
    generate: Option<&GenerateArgs>,
    build: Option<&BuildArgs>,
) -> OptionOverrides {
    let mut overrides = OptionOverrides {
        flavor: flavor.flavor.clone(),
        ..OptionOverrides::default()
    };
    if let Some(deps) = deps {
        overrides.profile = deps.profile.clone();
        overrides.conan_options = deps.options.clone();
    }
    if let Some(generate) = generate {
        overrides.generator = generate.generator.clone();
        overrides.shared = tri_state(generate.shared, generate.no_shared);
        overrides.tests = tri_state(generate.tests, generate.no_tests);
        overrides.variables = generate.variables.clone();
        overrides.unvariables = generate.unvariables.clone();
        overrides.prefix = generate.prefix.clone();
    }
    if let Some(build) = build {
        overrides.jobs = build.jobs;
        overrides.target = build.target.clone();
    }
    overrides
}

/// `--foo` / `--no-foo` flag pair to an optional override
fn tri_state(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_state() {
        assert_eq!(tri_state(true, false), Some(true));
        assert_eq!(tri_state(false, true), Some(false));
        assert_eq!(tri_state(false, false), None);
    }

    #[test]
    fn test_merge_keeps_one_shot_target() {
        let build = BuildArgs {
            jobs: Some(2),
            target: Some("docs".to_string()),
        };
        let overrides = merge(&FlavorArgs::default(), None, None, Some(&build));
        assert_eq!(overrides.target.as_deref(), Some("docs"));
        assert_eq!(overrides.jobs, Some(2));
        assert!(overrides.flavor.is_none());
    }
}
