//! External process execution
//!
//! Two primitives: streamed execution for commands whose output belongs on
//! the user's terminal (xcodebuild, log streaming), and captured execution
//! for commands whose output we parse (simctl list, -showBuildSettings).
//!
//! Both report "the tool could not be started" (`ExecutableNotFound`) and
//! "the tool ran and failed" (`ProcessExitedNonZero`) as distinct errors.
//! No retries and no timeouts live at this layer.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{Error, Result};
use tracing::debug;

/// Buffered output of a captured execution
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Resolve a bare command name against PATH.
///
/// Anything containing a path separator is used as-is; spawn reports the
/// error if the file does not exist.
fn resolve_command(command: &str) -> Result<PathBuf> {
    if Path::new(command).components().count() > 1 {
        return Ok(PathBuf::from(command));
    }
    which::which(command).map_err(|_| Error::executable_not_found(command))
}

fn spawn_error(command: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::executable_not_found(command)
    } else {
        Error::Io(err)
    }
}

/// Run a command with the child's stdout/stderr connected to the caller's
/// terminal, blocking until it exits.
pub async fn run_streamed<I, S>(command: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = resolve_command(command)?;
    debug!("Running (streamed): {}", program.display());

    let status = Command::new(&program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| spawn_error(command, e))?;

    if !status.success() {
        return Err(Error::process_exited(command, status.code(), ""));
    }
    Ok(())
}

/// Run a command with both output streams buffered, blocking until it exits.
///
/// Stdout and stderr are drained concurrently by `output()`, so a child that
/// fills one pipe while writing heavily to the other cannot deadlock us.
/// Captured streams are trimmed of surrounding whitespace.
pub async fn run_captured<I, S>(command: &str, args: I) -> Result<CapturedOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = resolve_command(command)?;
    debug!("Running (captured): {}", program.display());

    let output = Command::new(&program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| spawn_error(command, e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(Error::process_exited(command, output.status.code(), stderr));
    }

    Ok(CapturedOutput { stdout, stderr })
}

/// Run `producer | consumer` with the consumer's output on the caller's
/// terminal, blocking until both exit.
///
/// The producer's failure wins when both fail; its exit status is the one
/// that means the underlying tool broke.
pub async fn run_streamed_piped<I, S, J, T>(
    producer: &str,
    producer_args: I,
    consumer: &str,
    consumer_args: J,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    J: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    let producer_program = resolve_command(producer)?;
    let consumer_program = resolve_command(consumer)?;
    debug!(
        "Running (piped): {} | {}",
        producer_program.display(),
        consumer_program.display()
    );

    let mut producer_child = Command::new(&producer_program)
        .args(producer_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| spawn_error(producer, e))?;

    let pipe = producer_child
        .stdout
        .take()
        .expect("stdout was configured");
    let pipe: Stdio = pipe.try_into().map_err(Error::Io)?;

    let mut consumer_child = Command::new(&consumer_program)
        .args(consumer_args)
        .stdin(pipe)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| spawn_error(consumer, e))?;

    let producer_status = producer_child.wait().await?;
    let consumer_status = consumer_child.wait().await?;

    if !producer_status.success() {
        return Err(Error::process_exited(producer, producer_status.code(), ""));
    }
    if !consumer_status.success() {
        return Err(Error::process_exited(consumer, consumer_status.code(), ""));
    }
    Ok(())
}
