//! Project path layout
//!
//! All paths the tool reads or writes, derived from the source directory
//! and the configured build directory. Build outputs for a flavor live in
//! flavor-specific subdirectories, which is what scopes fingerprints
//! per-flavor.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::flavor::Flavor;
use crate::error::FrostingError;

/// Resolved project directory layout
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project source directory (absolute)
    pub source_dir: PathBuf,
    /// Build directory (absolute)
    pub build_dir: PathBuf,
}

impl ProjectPaths {
    /// Create a layout from the source directory and the build directory
    /// setting. A relative build directory is resolved against the source
    /// directory.
    pub fn new(source_dir: PathBuf, build_dir: &str) -> Self {
        let build_dir = if Path::new(build_dir).is_absolute() {
            PathBuf::from(build_dir)
        } else {
            source_dir.join(build_dir)
        };
        Self {
            source_dir,
            build_dir,
        }
    }

    /// Create the build and log directories if they do not exist
    pub fn ensure_build_dirs(&self) -> Result<(), FrostingError> {
        for dir in [&self.build_dir, &self.logs_dir()] {
            std::fs::create_dir_all(dir).map_err(|e| FrostingError::Io {
                path: dir.clone(),
                error: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Fingerprint store file
    pub fn state_file(&self) -> PathBuf {
        self.build_dir.join(defaults::STATE_FILE)
    }

    /// External tool log directory
    pub fn logs_dir(&self) -> PathBuf {
        self.build_dir.join(defaults::LOGS_DIR)
    }

    /// Log file for one command
    pub fn log_file(&self, command: &str) -> PathBuf {
        self.logs_dir().join(format!("{command}.log"))
    }

    /// Conan output directory
    pub fn conan_dir(&self, flavor: Flavor) -> PathBuf {
        self.build_dir.join("conan").join(flavor.as_str())
    }

    /// CMake binary directory for a flavor
    pub fn cmake_dir(&self, flavor: Flavor) -> PathBuf {
        self.build_dir.join("cmake").join(flavor.as_str())
    }

    /// Top-level CMake source file
    pub fn cmake_lists(&self) -> PathBuf {
        self.source_dir.join("CMakeLists.txt")
    }

    /// Candidate Conan recipe paths, in priority order
    pub fn recipe_candidates(&self) -> [PathBuf; 2] {
        [
            self.source_dir.join("conanfile.py"),
            self.source_dir.join("conanfile.txt"),
        ]
    }

    /// The Conan recipe, if the project has one
    pub fn recipe(&self) -> Option<PathBuf> {
        self.recipe_candidates().into_iter().find(|p| p.is_file())
    }

    /// The Conan profile file for a profile name
    pub fn conan_profile(&self, profile: &str) -> PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".conan2")
            .join("profiles")
            .join(profile)
    }

    /// The toolchain file Conan generates, if present
    ///
    /// The location depends on the recipe's layout, so both known spots
    /// are probed.
    pub fn conan_toolchain(&self, flavor: Flavor) -> Option<PathBuf> {
        let conan_dir = self.conan_dir(flavor);
        [
            conan_dir.join("conan_toolchain.cmake"),
            conan_dir.join("build").join("generators").join("conan_toolchain.cmake"),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}
