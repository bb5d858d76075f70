//! Error types for frosting
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Failed to write config file
    #[error("Failed to write config file '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Fingerprint store errors
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to read state file
    #[error("Failed to read state file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to write state file
    #[error("Failed to write state file '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Command graph errors
///
/// The graph is fixed at compile time, so a cycle is a tool defect,
/// not a user error.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Circular prerequisite chain detected
    #[error("Circular command prerequisites: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// A prerequisite names a command missing from the graph
    #[error("Unknown prerequisite '{name}' declared by '{command}'")]
    UnknownPrerequisite { command: String, name: String },
}

/// Command-line option errors
#[derive(Error, Debug)]
pub enum OptionError {
    /// Not a NAME or NAME=VALUE string
    #[error("Bad option: `{0}` (expected NAME or NAME=VALUE)")]
    Invalid(String),

    /// Unknown flavor name
    #[error("Unknown flavor '{name}': must be one of {choices:?}")]
    UnknownFlavor { name: String, choices: Vec<String> },
}

/// External tool invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Executable not found
    #[error("'{tool}' not found on PATH. Set its path in .frosting.toml")]
    NotFound { tool: String },

    /// Failed to spawn the process
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Nonzero exit status
    #[error("'{program}' exited with status {code} (log: {})", log.display())]
    Failed {
        program: String,
        code: i32,
        log: PathBuf,
    },

    /// IO error while preparing an action
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Top-level frosting error type
#[derive(Error, Debug)]
pub enum FrostingError {
    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Fingerprint store error
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Command graph error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Option error
    #[error("Option error: {0}")]
    Option(#[from] OptionError),

    /// External tool failure
    #[error("{0}")]
    Tool(#[from] ToolError),

    /// IO error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}
