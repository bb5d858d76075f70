//! Infrastructure layer
//!
//! Process invocation, filesystem helpers, and the external toolchain.

pub mod filesystem;
pub mod process;
pub mod toolchain;
