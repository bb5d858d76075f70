//! Output formatting and progress indicators

use indicatif::{ProgressBar, ProgressStyle};

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}

/// Console behavior for external tool runs
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    /// Suppress command echo and progress; errors still surface
    pub quiet: bool,
    /// Stream tool output to the console as it arrives
    pub stream: bool,
}

/// Create a spinner shown while an external tool runs quietly
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error chain with the CLI-level failure indicator.
///
/// Tool output has already been surfaced by the process layer; this adds
/// the distinct failure line the user scans for.
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", status::ERROR);
}
