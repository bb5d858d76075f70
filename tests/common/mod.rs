//! Common test utilities and helpers
//!
//! Provides a temporary project directory plus stub `cmake`, `conan`, and
//! `ctest` executables that record their invocations instead of doing any
//! real work, so the whole command chain can run hermetically.

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Test project context
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the frosting binary in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_frosting"));
        cmd.current_dir(self.path());
        cmd.args(args);
        cmd.output().expect("Failed to execute frosting")
    }

    /// Install stub tool executables and point the settings file at them.
    ///
    /// Each stub appends its name and arguments to `calls.log` and exits
    /// successfully. Call this once per project; use [`Self::fail_tool`] to
    /// make one of them fail afterwards.
    #[allow(dead_code)]
    pub fn install_tools(&self) {
        let bin = self.path().join("bin");
        std::fs::create_dir_all(&bin).expect("Failed to create bin directory");
        for name in ["cmake", "conan", "ctest"] {
            self.write_tool(name, 0);
        }
        let config = format!(
            "cmake-path = \"{bin}/cmake\"\nconan-path = \"{bin}/conan\"\nctest-path = \"{bin}/ctest\"\n",
            bin = bin.display()
        );
        let path = self.path().join(".frosting.toml");
        let mut existing = if path.exists() {
            std::fs::read_to_string(&path).expect("Failed to read settings")
        } else {
            String::new()
        };
        existing.push_str(&config);
        std::fs::write(&path, existing).expect("Failed to write settings");
    }

    /// Make one stub tool exit with status 1
    #[allow(dead_code)]
    pub fn fail_tool(&self, name: &str) {
        self.write_tool(name, 1);
    }

    /// Restore a failed stub tool to success
    #[allow(dead_code)]
    pub fn fix_tool(&self, name: &str) {
        self.write_tool(name, 0);
    }

    fn write_tool(&self, name: &str, exit_code: i32) {
        use std::os::unix::fs::PermissionsExt;

        let calls = self.path().join("calls.log");
        let script = format!(
            "#!/bin/sh\necho \"{name} $@\" >> \"{calls}\"\nexit {exit_code}\n",
            calls = calls.display()
        );
        let tool = self.path().join("bin").join(name);
        std::fs::write(&tool, script).expect("Failed to write stub tool");
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to mark stub tool executable");
    }

    /// Recorded stub invocations, one line per call
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        let path = self.path().join("calls.log");
        if !path.exists() {
            return Vec::new();
        }
        std::fs::read_to_string(path)
            .expect("Failed to read calls log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Forget recorded stub invocations
    #[allow(dead_code)]
    pub fn clear_calls(&self) {
        let _ = std::fs::remove_file(self.path().join("calls.log"));
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal CMake source file
#[allow(dead_code)]
pub const SAMPLE_CMAKE_LISTS: &str = "cmake_minimum_required(VERSION 3.16)\nproject(example)\n";

/// Minimal Conan recipe
#[allow(dead_code)]
pub const SAMPLE_CONANFILE: &str = "[requires]\nzlib/1.3.1\n";
