//! Option resolution
//!
//! Merges command-line overrides with persisted settings and hard-coded
//! defaults into one [`ResolvedOptions`] value that the runner, the
//! fingerprint tracker, and the toolchain all read. Persistable overrides
//! are written back to the settings file as part of resolution, before any
//! command action runs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::defaults;
use crate::core::flavor::Flavor;
use crate::core::paths::ProjectPaths;
use crate::core::settings::Settings;
use crate::error::{FrostingError, OptionError};

/// Raw command-line overrides, independent of the clap surface
#[derive(Debug, Default, Clone)]
pub struct OptionOverrides {
    pub flavor: Option<String>,
    pub profile: Option<String>,
    /// `NAME[=VALUE]` Conan options to set
    pub conan_options: Vec<String>,
    pub generator: Option<String>,
    pub shared: Option<bool>,
    pub tests: Option<bool>,
    /// `NAME[=VALUE]` CMake variables to set
    pub variables: Vec<String>,
    /// CMake variable names to unset
    pub unvariables: Vec<String>,
    pub prefix: Option<String>,
    pub jobs: Option<usize>,
    /// One-shot build target; never persisted
    pub target: Option<String>,
}

/// Fully resolved option values for one invocation
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub flavor: Flavor,
    pub profile: String,
    pub conan_options: BTreeMap<String, String>,
    pub generator: Option<String>,
    pub shared: bool,
    pub tests: bool,
    pub cmake_variables: BTreeMap<String, String>,
    pub prefix: String,
    pub jobs: usize,
    pub target: Option<String>,
}

impl ResolvedOptions {
    /// Resolve every option against the settings store.
    ///
    /// Overrides are validated before they are persisted, so a bad value
    /// on the command line never lands in the settings file.
    pub fn resolve(
        settings: &mut Settings,
        overrides: &OptionOverrides,
    ) -> Result<Self, FrostingError> {
        let flavor = match &overrides.flavor {
            Some(name) => Some(name.parse::<Flavor>()?),
            None => None,
        };
        let flavor = settings
            .resolve_str(
                "selection",
                flavor.map(Flavor::as_str),
                defaults::FLAVOR,
            )?
            .parse::<Flavor>()?;
        settings.ensure_member("flavors", flavor.as_str())?;

        let profile = settings.resolve_str(
            "conan.profile",
            overrides.profile.as_deref(),
            defaults::CONAN_PROFILE,
        )?;

        let conan_adds = parse_options(&overrides.conan_options, "True")?;
        let conan_options = settings.resolve_map("conan.options", &conan_adds, &[])?;

        let generator = settings.resolve_opt_str("cmake.generator", overrides.generator.as_deref())?;
        let shared = settings.resolve_bool("cmake.shared", overrides.shared, false)?;
        let tests = settings.resolve_bool("cmake.tests", overrides.tests, true)?;

        let variable_adds = parse_options(&overrides.variables, "TRUE")?;
        let cmake_variables =
            settings.resolve_map("cmake.variables", &variable_adds, &overrides.unvariables)?;

        let prefix = settings.resolve_str("prefix", overrides.prefix.as_deref(), defaults::PREFIX)?;

        let jobs = settings.resolve_usize("jobs", overrides.jobs, num_cpus::get())?;

        Ok(Self {
            flavor,
            profile,
            conan_options,
            generator,
            shared,
            tests,
            cmake_variables,
            prefix,
            jobs,
            target: overrides.target.clone(),
        })
    }

    /// Absolute install prefix (a relative setting resolves against the
    /// source directory).
    pub fn prefix_path(&self, paths: &ProjectPaths) -> PathBuf {
        let prefix = PathBuf::from(&self.prefix);
        if prefix.is_absolute() {
            prefix
        } else {
            paths.source_dir.join(prefix)
        }
    }
}

/// Option names whose values participate in a command's fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedOption {
    Flavor,
    Profile,
    ConanOptions,
    Generator,
    Shared,
    Tests,
    CmakeVariables,
    Prefix,
    Target,
}

impl TrackedOption {
    /// Stable name used as the fingerprint key
    pub fn name(self) -> &'static str {
        match self {
            TrackedOption::Flavor => "flavor",
            TrackedOption::Profile => "profile",
            TrackedOption::ConanOptions => "conan-options",
            TrackedOption::Generator => "generator",
            TrackedOption::Shared => "shared",
            TrackedOption::Tests => "tests",
            TrackedOption::CmakeVariables => "cmake-variables",
            TrackedOption::Prefix => "prefix",
            TrackedOption::Target => "target",
        }
    }

    /// Canonical string form of the resolved value
    pub fn value_of(self, opts: &ResolvedOptions) -> String {
        match self {
            TrackedOption::Flavor => opts.flavor.to_string(),
            TrackedOption::Profile => opts.profile.clone(),
            TrackedOption::ConanOptions => join_map(&opts.conan_options),
            TrackedOption::Generator => opts.generator.clone().unwrap_or_default(),
            TrackedOption::Shared => opts.shared.to_string(),
            TrackedOption::Tests => opts.tests.to_string(),
            TrackedOption::CmakeVariables => join_map(&opts.cmake_variables),
            TrackedOption::Prefix => opts.prefix.clone(),
            TrackedOption::Target => opts.target.clone().unwrap_or_default(),
        }
    }
}

fn join_map(map: &BTreeMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Parse repeatable `NAME[=VALUE]` strings into a map. A bare `NAME`
/// receives `default` (tools disagree on the spelling of "true").
pub fn parse_options(
    options: &[String],
    default: &str,
) -> Result<BTreeMap<String, String>, OptionError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^([^=]+)(?:=(.+))?$").expect("valid regex"));

    let mut parsed = BTreeMap::new();
    for option in options {
        let captures = pattern
            .captures(option)
            .ok_or_else(|| OptionError::Invalid(option.clone()))?;
        let name = captures.get(1).expect("group 1 always matches").as_str();
        let value = captures.get(2).map_or(default, |m| m.as_str());
        parsed.insert(name.to_string(), value.to_string());
    }
    Ok(parsed)
}
