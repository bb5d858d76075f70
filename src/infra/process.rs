//! External process invocation
//!
//! Runs one external tool as a blocking child process. Output is always
//! captured to a per-command log file under the build directory; at
//! verbosity >= 1 it is streamed to the console as well. On failure the
//! captured output is printed in full so the user never has to hunt for
//! the log.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::cli::output::{create_spinner, OutputMode};
use crate::error::ToolError;

/// One external tool invocation
#[derive(Debug)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line as shown to the user and written to the log
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('\'');
                line.push_str(arg);
                line.push('\'');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Run an invocation, teeing its output to `log_path`.
///
/// Blocks until the child exits. A nonzero exit status is a
/// [`ToolError::Failed`] whose captured output has already been surfaced.
pub fn run_logged(
    invocation: &Invocation,
    log_path: &Path,
    mode: OutputMode,
) -> Result<(), ToolError> {
    let line = invocation.display();
    if !mode.quiet {
        eprintln!("{line}");
    }

    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let spawn_error = |e: std::io::Error| ToolError::Spawn {
        program: invocation.program.display().to_string(),
        error: e.to_string(),
    };

    let mut child = command.spawn().map_err(spawn_error)?;

    let captured = Arc::new(Mutex::new(format!("{line}\n").into_bytes()));
    let stdout = child.stdout.take().expect("stdout is piped");
    let stderr = child.stderr.take().expect("stderr is piped");
    let readers = [
        spawn_reader(stdout, Arc::clone(&captured), mode.stream),
        spawn_reader(stderr, Arc::clone(&captured), mode.stream),
    ];

    let spinner = (!mode.stream && !mode.quiet).then(|| create_spinner(&line));

    let status = child.wait().map_err(spawn_error)?;
    for reader in readers {
        let _ = reader.join();
    }
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let captured = captured.lock().expect("reader threads have exited");
    if let Err(e) = std::fs::write(log_path, captured.as_slice()) {
        tracing::warn!("Cannot write log '{}': {e}", log_path.display());
    }

    if status.success() {
        return Ok(());
    }

    // Non-streaming runs have shown nothing yet; surface the tool's
    // output in full before the failure indicator, quiet or not.
    if !mode.stream {
        eprint!("{}", String::from_utf8_lossy(&captured));
    }
    Err(ToolError::Failed {
        program: invocation.program.display().to_string(),
        code: status.code().unwrap_or(-1),
        log: log_path.to_path_buf(),
    })
}

fn spawn_reader<R: std::io::Read + Send + 'static>(
    source: R,
    captured: Arc<Mutex<Vec<u8>>>,
    stream: bool,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if stream {
                eprintln!("{line}");
            }
            let mut captured = captured.lock().expect("no poisoned capture buffer");
            captured.extend_from_slice(line.as_bytes());
            captured.push(b'\n');
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_successful_invocation_writes_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("step.log");

        let invocation = Invocation::new(Path::new("sh"))
            .arg("-c")
            .arg("echo hello");
        run_logged(&invocation, &log, OutputMode::default()).unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("hello"));
    }

    #[test]
    fn test_nonzero_exit_is_a_failure_with_code() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("step.log");

        let invocation = Invocation::new(Path::new("sh")).arg("-c").arg("exit 3");
        let err = run_logged(&invocation, &log, OutputMode::default()).unwrap_err();
        match err {
            ToolError::Failed { code, .. } => assert_eq!(code, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("step.log");

        let invocation = Invocation::new(Path::new("/nonexistent/tool"));
        let err = run_logged(&invocation, &log, OutputMode::default()).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn test_display_quotes_spaced_arguments() {
        let invocation = Invocation::new(Path::new("cmake")).arg("-G").arg("Unix Makefiles");
        assert_eq!(invocation.display(), "cmake -G 'Unix Makefiles'");
    }
}
