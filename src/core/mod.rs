//! Core business logic
//!
//! The command graph, fingerprint tracking, and the runner that walks a
//! resolved command chain deciding which steps are stale.

pub mod fingerprint;
pub mod flavor;
pub mod graph;
pub mod options;
pub mod paths;
pub mod runner;
pub mod settings;
