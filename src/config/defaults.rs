//! Default values used across the crate

/// Project configuration file name, relative to the source directory
pub const CONFIG_FILE: &str = ".frosting.toml";

/// Build directory, relative to the source directory
pub const BUILD_DIR: &str = ".build";

/// Install prefix, relative to the source directory
pub const PREFIX: &str = ".install";

/// Fingerprint store file name, relative to the build directory
pub const STATE_FILE: &str = "state.toml";

/// Log directory name, relative to the build directory
pub const LOGS_DIR: &str = "logs";

/// Conan profile name
pub const CONAN_PROFILE: &str = "default";

/// Selected flavor
pub const FLAVOR: &str = "release";

/// Generator tool executable
pub const CMAKE: &str = "cmake";

/// Package manager executable
pub const CONAN: &str = "conan";

/// Test runner executable
pub const CTEST: &str = "ctest";

/// Console verbosity (0-3)
pub const VERBOSITY: u8 = 0;
