//! External build command execution with streamed output

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::build::sink::LogSink;
use crate::errors::PipelineError;

/// Run `command` under a shell in `dir`, forwarding every stdout and stderr
/// line to `sink` the moment it appears. Returns the command's exit code.
pub async fn run_streamed(
    command: &str,
    dir: &Path,
    sink: &dyn LogSink,
) -> Result<i32, PipelineError> {
    debug!("Running build command in {}: {}", dir.display(), command);

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PipelineError::Internal("build stdout not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PipelineError::Internal("build stderr not captured".to_string()))?;

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = stdout_lines.next_line(), if !stdout_done => match line? {
                Some(line) => sink.emit(&line).await,
                None => stdout_done = true,
            },
            line = stderr_lines.next_line(), if !stderr_done => match line? {
                Some(line) => sink.emit(&line).await,
                None => stderr_done = true,
            },
        }
    }

    let status = child.wait().await?;
    Ok(status.code().unwrap_or(-1))
}
