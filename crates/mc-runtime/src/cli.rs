//! Bounded execution of the agent CLI.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use mc_core::ProviderError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Captured result of one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The deadline passed and the child was killed; output is partial.
    pub timed_out: bool,
}

impl CommandOutput {
    /// stdout followed by stderr, as a shell `2>&1` would show them.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }
}

/// Run `binary args...` and wait at most `timeout` for it to exit.
///
/// A non-zero exit is not an error here: callers decide whether partial
/// output is still useful. The child is killed if the timeout elapses.
///
/// # Errors
///
/// `CommandFailed` if the process cannot be spawned, `Timeout` if it does
/// not finish in time.
pub async fn run_bounded<I, S>(
    binary: &Path,
    args: I,
    timeout: Duration,
) -> Result<CommandOutput, ProviderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let out = capture_bounded(binary, args, timeout).await?;
    if out.timed_out {
        return Err(ProviderError::Timeout {
            command: binary.display().to_string(),
            secs: timeout.as_secs(),
        });
    }
    Ok(out)
}

/// Like [`run_bounded`], but a timeout yields whatever the child printed
/// before it was killed, with `timed_out` set.
///
/// # Errors
///
/// `CommandFailed` if the process cannot be spawned or its pipes fail.
pub async fn capture_bounded<I, S>(
    binary: &Path,
    args: I,
    timeout: Duration,
) -> Result<CommandOutput, ProviderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let command = binary.display().to_string();
    let mut child = cmd
        .spawn()
        .map_err(|e| ProviderError::CommandFailed(format!("{command}: {e}")))?;

    let mut child_stdout = child.stdout.take();
    let mut child_stderr = child.stderr.take();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let finished = tokio::time::timeout(timeout, async {
        let (status, out, err) = tokio::join!(
            child.wait(),
            drain(child_stdout.as_mut(), &mut stdout),
            drain(child_stderr.as_mut(), &mut stderr),
        );
        out?;
        err?;
        status
    })
    .await;

    let (status, timed_out) = match finished {
        Ok(Ok(status)) => (Some(status), false),
        Ok(Err(e)) => return Err(ProviderError::CommandFailed(format!("{command}: {e}"))),
        Err(_) => {
            if let Err(e) = child.kill().await {
                debug!(command = %command, error = %e, "Failed to kill timed-out CLI");
            }
            (None, true)
        }
    };

    debug!(
        command = %command,
        code = ?status.and_then(|s| s.code()),
        timed_out,
        stdout_len = stdout.len(),
        "CLI finished"
    );

    Ok(CommandOutput {
        success: status.is_some_and(|s| s.success()),
        code: status.and_then(|s| s.code()),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        timed_out,
    })
}

/// Append everything `reader` yields to `buf`, one read at a time.
async fn drain<R>(reader: Option<&mut R>, buf: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
