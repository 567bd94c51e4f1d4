//! Ready-made probes for [`crate::wait`].
//!
//! Every failure here is operational: the poller reports it and tries again
//! on the next tick.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;

/// Output kept from a failing command, counted from the end.
const MAX_OUTPUT: usize = 10 * 1024;

#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("command failed ({status}): {output}")]
    Failed { status: ExitStatus, output: String },

    #[error("failed to spawn command: {0}")]
    Spawn(std::io::Error),

    #[error("command timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("waiting for command failed: {0}")]
    Wait(std::io::Error),
}

/// Probe that runs `sh -c <command>` in `cwd` and succeeds on exit status 0.
///
/// `attempt_timeout` bounds a single attempt; `None` waits for the command to
/// exit on its own.
pub fn shell_probe(
    command: String,
    cwd: PathBuf,
    attempt_timeout: Option<Duration>,
) -> impl FnMut() -> Result<bool, ProbeFailure> {
    move || run_shell(&command, &cwd, attempt_timeout).map(|_| true)
}

/// Probe that succeeds once `path` exists.
pub fn path_probe(path: PathBuf) -> impl FnMut() -> Result<bool, ProbeFailure> {
    move || Ok(path.exists())
}

/// Run a shell command, returning its combined output on success.
///
/// Stdout and stderr are drained on dedicated threads so a chatty command
/// cannot block on a full pipe. The timeout is enforced by a waiter thread
/// and `recv_timeout`. On Unix the shell leads its own process group, and on
/// expiry the whole group is killed so no descendant outlives the attempt.
pub fn run_shell(
    command: &str,
    cwd: &Path,
    timeout: Option<Duration>,
) -> Result<String, ProbeFailure> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let mut child = cmd.spawn().map_err(ProbeFailure::Spawn)?;

    let child_pid = child.id();
    let stdout_thread = spawn_reader(child.stdout.take());
    let stderr_thread = spawn_reader(child.stderr.take());

    let wait_result = match timeout {
        None => child.wait(),
        Some(timeout_dur) => {
            let (tx, rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let _ = tx.send(child.wait());
            });
            match rx.recv_timeout(timeout_dur) {
                Ok(result) => result,
                Err(_) => {
                    kill_process_group(child_pid);
                    // Reap the shell and drain the pipes, which close once
                    // the group is gone.
                    let _ = rx.recv();
                    let _ = stdout_thread.join();
                    let _ = stderr_thread.join();
                    return Err(ProbeFailure::TimedOut(timeout_dur));
                }
            }
        }
    };

    let stdout_buf = stdout_thread.join().unwrap_or_default();
    let stderr_buf = stderr_thread.join().unwrap_or_default();
    let status = wait_result.map_err(ProbeFailure::Wait)?;
    let output = combine_output(&stdout_buf, &stderr_buf);

    if status.success() {
        Ok(output)
    } else {
        Err(ProbeFailure::Failed { status, output })
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    source: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut r) = source {
            let _ = r.read_to_string(&mut buf);
        }
        buf
    })
}

/// Join stdout/stderr, trim, and keep at most the last 10 KiB.
fn combine_output(stdout: &str, stderr: &str) -> String {
    let output = if stderr.is_empty() {
        stdout.to_string()
    } else if stdout.is_empty() {
        stderr.to_string()
    } else {
        format!("{stdout}\n{stderr}")
    };
    let trimmed = output.trim();
    if trimmed.len() <= MAX_OUTPUT {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - MAX_OUTPUT;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

/// Best-effort SIGKILL of the process group led by `pid`.
fn kill_process_group(pid: u32) {
    #[cfg(unix)]
    let target = format!("-{pid}");
    #[cfg(not(unix))]
    let target = pid.to_string();

    let _ = Command::new("kill")
        .args(["-s", "KILL", "--"])
        .arg(target)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}
