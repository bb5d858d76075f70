//! Build flavors
//!
//! A flavor is a named build variant. Names are case-insensitive on input
//! and canonicalized to lowercase; CMake and Conan receive the capitalized
//! `build_type` spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionError;

/// A build flavor (variant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Optimized build
    Release,
    /// Build with debug information
    Debug,
}

impl Flavor {
    /// All known flavors
    pub const ALL: [Flavor; 2] = [Flavor::Release, Flavor::Debug];

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Flavor::Release => "release",
            Flavor::Debug => "debug",
        }
    }

    /// The `build_type` name CMake and Conan expect
    pub fn build_type(self) -> &'static str {
        match self {
            Flavor::Release => "Release",
            Flavor::Debug => "Debug",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "release" => Ok(Flavor::Release),
            "debug" => Ok(Flavor::Debug),
            _ => Err(OptionError::UnknownFlavor {
                name: s.to_string(),
                choices: Flavor::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            }),
        }
    }
}
