//! External toolchain
//!
//! Builds and runs the concrete CMake, Conan, and CTest invocations for
//! each command. This is the production [`ActionExecutor`]; the runner
//! itself never constructs a command line.

use std::path::{Path, PathBuf};

use crate::cli::output::OutputMode;
use crate::core::graph::{CommandId, CommandSpec};
use crate::core::options::ResolvedOptions;
use crate::core::paths::ProjectPaths;
use crate::core::runner::ActionExecutor;
use crate::core::settings::Settings;
use crate::error::{FrostingError, ToolError};
use crate::infra::filesystem::remove_dir_all_quiet;
use crate::infra::process::{run_logged, Invocation};

/// Configured external tool executables
#[derive(Debug)]
pub struct Toolchain {
    cmake: String,
    conan: String,
    ctest: String,
    output: OutputMode,
}

impl Toolchain {
    /// Read tool paths from the settings store.
    ///
    /// The paths are settings-only (no CLI flags); executables are
    /// located lazily, when a command actually needs them.
    pub fn from_settings(
        settings: &mut Settings,
        output: OutputMode,
    ) -> Result<Self, FrostingError> {
        Ok(Self {
            cmake: settings.resolve_str("cmake-path", None, crate::config::defaults::CMAKE)?,
            conan: settings.resolve_str("conan-path", None, crate::config::defaults::CONAN)?,
            ctest: settings.resolve_str("ctest-path", None, crate::config::defaults::CTEST)?,
            output,
        })
    }

    fn locate(tool: &str) -> Result<PathBuf, ToolError> {
        if tool.contains(std::path::MAIN_SEPARATOR) {
            return Ok(PathBuf::from(tool));
        }
        which::which(tool).map_err(|_| ToolError::NotFound {
            tool: tool.to_string(),
        })
    }

    fn deps(&self, opts: &ResolvedOptions, paths: &ProjectPaths) -> Result<(), ToolError> {
        let Some(recipe) = paths.recipe() else {
            tracing::info!("No conanfile in {}, nothing to resolve", paths.source_dir.display());
            return Ok(());
        };
        tracing::debug!("Using recipe {}", recipe.display());

        let conan_dir = paths.conan_dir(opts.flavor);
        create_dir(&conan_dir)?;

        let conan = Self::locate(&self.conan)?;
        let mut invocation = Invocation::new(&conan)
            .arg("install")
            .arg(paths.source_dir.display().to_string())
            .args(["--build", "missing"])
            .arg("--output-folder")
            .arg(conan_dir.display().to_string())
            .args(["--profile:build", &opts.profile])
            .args(["--profile:host", &opts.profile]);
        for (name, value) in &opts.conan_options {
            invocation = invocation.arg("--options").arg(format!("{name}={value}"));
        }
        invocation = invocation
            .arg("--settings")
            .arg(format!("build_type={}", opts.flavor.build_type()));

        run_logged(&invocation, &paths.log_file("deps"), self.output)
    }

    fn generate(&self, opts: &ResolvedOptions, paths: &ProjectPaths) -> Result<(), ToolError> {
        // A configured binary directory cannot be re-pointed at new
        // options reliably; start it fresh on every (re)configure.
        let cmake_dir = paths.cmake_dir(opts.flavor);
        remove_dir_all_quiet(&cmake_dir).map_err(|e| ToolError::Io {
            path: cmake_dir.clone(),
            error: e.to_string(),
        })?;
        create_dir(&cmake_dir)?;

        let cmake = Self::locate(&self.cmake)?;
        let mut invocation = Invocation::new(&cmake)
            .arg("-S")
            .arg(paths.source_dir.display().to_string())
            .arg("-B")
            .arg(cmake_dir.display().to_string());
        if let Some(generator) = &opts.generator {
            invocation = invocation.arg("-G").arg(generator);
        }

        let mut variables: Vec<(String, String)> = vec![
            ("CMAKE_BUILD_TYPE".into(), opts.flavor.build_type().into()),
            (
                "BUILD_SHARED_LIBS".into(),
                if opts.shared { "ON" } else { "OFF" }.into(),
            ),
            (
                "BUILD_TESTING".into(),
                if opts.tests { "ON" } else { "OFF" }.into(),
            ),
            (
                "CMAKE_INSTALL_PREFIX".into(),
                opts.prefix_path(paths).display().to_string(),
            ),
        ];
        if let Some(toolchain) = paths.conan_toolchain(opts.flavor) {
            variables.push((
                "CMAKE_TOOLCHAIN_FILE".into(),
                toolchain.display().to_string(),
            ));
        }
        // User variables go last so they can override anything above.
        for (name, value) in &opts.cmake_variables {
            variables.push((name.clone(), value.clone()));
        }
        for (name, value) in variables {
            invocation = invocation.arg(format!("-D{name}={value}"));
        }

        run_logged(&invocation, &paths.log_file("generate"), self.output)
    }

    fn build(&self, opts: &ResolvedOptions, paths: &ProjectPaths) -> Result<(), ToolError> {
        let cmake = Self::locate(&self.cmake)?;
        let mut invocation = Invocation::new(&cmake)
            .arg("--build")
            .arg(paths.cmake_dir(opts.flavor).display().to_string())
            .arg("--parallel")
            .arg(opts.jobs.to_string());
        if let Some(target) = &opts.target {
            invocation = invocation.arg("--target").arg(target);
        }
        run_logged(&invocation, &paths.log_file("build"), self.output)
    }

    fn test(&self, opts: &ResolvedOptions, paths: &ProjectPaths) -> Result<(), ToolError> {
        let ctest = Self::locate(&self.ctest)?;
        let invocation = Invocation::new(&ctest)
            .arg("--test-dir")
            .arg(paths.cmake_dir(opts.flavor).display().to_string())
            .arg("--output-on-failure");
        run_logged(&invocation, &paths.log_file("test"), self.output)
    }

    fn install(&self, opts: &ResolvedOptions, paths: &ProjectPaths) -> Result<(), ToolError> {
        let cmake = Self::locate(&self.cmake)?;
        let invocation = Invocation::new(&cmake)
            .arg("--install")
            .arg(paths.cmake_dir(opts.flavor).display().to_string())
            .arg("--prefix")
            .arg(opts.prefix_path(paths).display().to_string());
        run_logged(&invocation, &paths.log_file("install"), self.output)
    }
}

impl ActionExecutor for Toolchain {
    fn invoke(
        &self,
        spec: &CommandSpec,
        opts: &ResolvedOptions,
        paths: &ProjectPaths,
    ) -> Result<(), ToolError> {
        match spec.id {
            CommandId::Deps => self.deps(opts, paths),
            CommandId::Generate => self.generate(opts, paths),
            CommandId::Build => self.build(opts, paths),
            CommandId::Test => self.test(opts, paths),
            CommandId::Install => self.install(opts, paths),
        }
    }
}

fn create_dir(dir: &Path) -> Result<(), ToolError> {
    std::fs::create_dir_all(dir).map_err(|e| ToolError::Io {
        path: dir.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::OptionOverrides;
    use tempfile::TempDir;

    #[test]
    fn test_tool_paths_come_from_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".frosting.toml");
        std::fs::write(&path, "cmake-path = \"/opt/cmake/bin/cmake\"\n").unwrap();
        let mut settings = Settings::load(&path).unwrap();

        let toolchain = Toolchain::from_settings(&mut settings, OutputMode::default()).unwrap();
        assert_eq!(toolchain.cmake, "/opt/cmake/bin/cmake");
        assert_eq!(toolchain.conan, "conan");
    }

    #[test]
    fn test_locate_keeps_explicit_paths() {
        let located = Toolchain::locate("/usr/local/bin/cmake").unwrap();
        assert_eq!(located, PathBuf::from("/usr/local/bin/cmake"));
    }

    #[test]
    fn test_deps_without_recipe_is_a_noop_success() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::new(dir.path().to_path_buf(), ".build");
        paths.ensure_build_dirs().unwrap();
        let mut settings = Settings::load(&dir.path().join(".frosting.toml")).unwrap();
        let opts = ResolvedOptions::resolve(&mut settings, &OptionOverrides::default()).unwrap();
        let toolchain = Toolchain::from_settings(&mut settings, OutputMode::default()).unwrap();

        toolchain.deps(&opts, &paths).unwrap();
    }
}
