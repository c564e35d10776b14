//! Child process helpers

use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, warn};

pub(crate) const STDOUT_LOG: &str = "stdout.log";
pub(crate) const STDERR_LOG: &str = "stderr.log";

/// Spawn `binary` in `dir`, capturing output into the directory's log files.
pub(crate) fn spawn(binary: &str, args: &[String], dir: &Path) -> std::io::Result<Child> {
    let stdout = File::create(dir.join(STDOUT_LOG))?;
    let stderr = File::create(dir.join(STDERR_LOG))?;

    Command::new(binary)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true)
        .spawn()
}

/// Exit status if the child stopped within `settle`.
pub(crate) async fn exited_within(
    child: &mut Child,
    settle: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    match tokio::time::timeout(settle, child.wait()).await {
        Ok(status) => status.map(Some),
        Err(_) => Ok(None),
    }
}

/// Ask the child to exit, then kill it if it outlives `timeout`.
///
/// The child is always reaped before this returns.
pub(crate) async fn terminate(child: &mut Child, timeout: Duration) -> std::io::Result<()> {
    if child.try_wait()?.is_some() {
        return Ok(());
    }

    if let Some(pid) = child.id() {
        if !send_sigterm(pid).await {
            debug!(pid, "SIGTERM not delivered; killing");
        }
    }

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => {
            debug!(status = ?status?, "Process exited");
            Ok(())
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Process ignored SIGTERM; killing");
            child.kill().await
        }
    }
}

#[cfg(unix)]
async fn send_sigterm(pid: u32) -> bool {
    match Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .status()
        .await
    {
        Ok(status) => status.success(),
        Err(e) => {
            debug!(pid, error = %e, "Failed to run kill");
            false
        }
    }
}

#[cfg(not(unix))]
async fn send_sigterm(pid: u32) -> bool {
    let _ = pid;
    false
}
