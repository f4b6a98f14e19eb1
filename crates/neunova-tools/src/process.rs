//! Running one external process with a deadline.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ToolError;

/// Longest stderr excerpt carried in an error.
const STDERR_LIMIT: usize = 2048;

/// A program plus its argument list.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run to completion or until `timeout` elapses.
    ///
    /// The child is killed when the wait is abandoned, so a hung tool never
    /// outlives the request. Arguments are not logged since they may carry
    /// passwords.
    pub async fn run(&self, timeout: Duration) -> Result<(), ToolError> {
        let program = self.program_name();
        let started = Instant::now();

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Launch {
                program: program.clone(),
                source,
            })?;

        debug!(%program, args = self.args.len(), "spawned external tool");

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                warn!(%program, timeout_ms = timeout.as_millis() as u64, "external tool timed out, killed");
                return Err(ToolError::Timeout {
                    program,
                    seconds: timeout.as_secs(),
                });
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if output.status.success() {
            debug!(%program, elapsed_ms, "external tool finished");
            return Ok(());
        }

        let stderr = excerpt(&output.stderr);
        warn!(%program, status = %output.status, elapsed_ms, %stderr, "external tool failed");
        Err(ToolError::Failed {
            program,
            status: output.status.to_string(),
            stderr,
        })
    }
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_LIMIT {
        return trimmed.to_string();
    }
    let mut end = STDERR_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
