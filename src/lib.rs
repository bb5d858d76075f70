//! Frosting - Incremental build orchestrator for CMake and Conan projects
//!
//! This library provides the core functionality for driving CMake and Conan
//! behind a single, stateful command interface. Each command knows its
//! prerequisites and its tracked inputs; steps whose inputs are unchanged
//! since the last successful run are skipped.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (command graph, fingerprints, runner)
//! - [`infra`] - Infrastructure layer (processes, filesystem)
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
