//! Python subprocess sandbox.
//!
//! Every call spawns one `python3 -I` worker in its own process group and
//! feeds it a JSON job on stdin. The worker moves its real stdout to a
//! private descriptor, points fd 1 at `/dev/null`, runs the program with
//! `print` captured, and writes a single JSON result on the private
//! descriptor. At the deadline the whole process group is SIGKILLed and
//! whatever the worker produced is thrown away.
//!
//! Descriptors 0, 1 and 2 all point at `/dev/null` while the program runs,
//! so an exec'd grandchild that leaves the group with `setsid` holds none of
//! the worker's pipes. Such a grandchild is outside the group and survives
//! the kill. A bare `fork()` without exec still inherits the private
//! descriptors and delays the pipe drain by up to the drain timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::models::{AnswerMode, SandboxConfig, SandboxResult};
use crate::domain::ports::{CodeSandbox, SandboxError};

/// Worker program run with `python3 -c`.
pub const HARNESS: &str = include_str!("harness.py");

/// Upper bound on waiting for pipes to drain after the worker exits.
const IO_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Lines of worker stderr kept in error reports.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Serialize)]
struct SandboxJob<'a> {
    code: &'a str,
    mode: &'a AnswerMode,
    headers: &'a [String],
    globals: &'a BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WorkerReport {
    ok: bool,
    value: String,
    report: String,
}

/// Sandbox backed by a fresh Python process per call.
#[derive(Debug, Clone)]
pub struct PythonSandbox {
    python_bin: String,
    headers: Vec<String>,
    globals: BTreeMap<String, serde_json::Value>,
}

impl PythonSandbox {
    pub fn new(python_bin: impl Into<String>) -> Self {
        Self {
            python_bin: python_bin.into(),
            headers: Vec::new(),
            globals: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            headers: config.headers.clone(),
            globals: config.globals.clone(),
        }
    }

    /// Setup snippets run before every program.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    /// Globals injected before every program.
    pub fn with_globals(mut self, globals: BTreeMap<String, serde_json::Value>) -> Self {
        self.globals = globals;
        self
    }

    pub fn python_bin(&self) -> &str {
        &self.python_bin
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("-I")
            .arg("-c")
            .arg(HARNESS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    fn interpret(stdout: &[u8], stderr: &[u8], exit: Option<std::process::ExitStatus>) -> SandboxResult {
        match serde_json::from_slice::<WorkerReport>(stdout) {
            Ok(report) if report.ok => SandboxResult::done(report.value.trim()),
            Ok(report) => SandboxResult::error(report.report),
            Err(_) => {
                let exit = exit.map_or_else(|| "unknown status".to_string(), |s| s.to_string());
                let tail = stderr_tail(stderr);
                if tail.is_empty() {
                    SandboxResult::error(format!("Worker exited ({exit}) without a result"))
                } else {
                    SandboxResult::error(format!("Worker exited ({exit}) without a result: {tail}"))
                }
            }
        }
    }
}

#[async_trait]
impl CodeSandbox for PythonSandbox {
    async fn execute(
        &self,
        code: &str,
        timeout: Duration,
        mode: &AnswerMode,
    ) -> Result<SandboxResult, SandboxError> {
        let job = SandboxJob {
            code,
            mode,
            headers: &self.headers,
            globals: &self.globals,
        };
        let payload = serde_json::to_vec(&job)?;

        let mut child = self.command().spawn().map_err(|source| SandboxError::Spawn {
            program: self.python_bin.clone(),
            source,
        })?;
        let pid = child.id();
        debug!(pid, mode = mode.as_str(), ?timeout, "Spawned sandbox worker");

        let mut stdout_handle = spawn_reader(child.stdout.take());
        let mut stderr_handle = spawn_reader(child.stderr.take());
        let stdin = child.stdin.take();

        let outcome = tokio::time::timeout(timeout, async {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(&payload).await {
                    Ok(()) => {}
                    // the worker died before reading its job; its exit explains why
                    Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(err) => return Err(err),
                }
                drop(stdin);
            }
            child.wait().await
        })
        .await;

        let exit = match outcome {
            Ok(status) => Some(status?),
            Err(_elapsed) => {
                debug!(pid, "Sandbox worker timed out");
                kill_process_group(pid);
                if let Err(err) = child.start_kill() {
                    debug!(pid, error = %err, "Worker already gone");
                }
                let _ = child.wait().await;
                stdout_handle.abort();
                stderr_handle.abort();
                return Ok(SandboxResult::timeout());
            }
        };

        // reap anything the program left behind in its group
        kill_process_group(pid);

        let stdout = drain(&mut stdout_handle).await;
        let stderr = drain(&mut stderr_handle).await;
        let result = Self::interpret(&stdout, &stderr, exit);
        debug!(pid, status = %result.status, "Sandbox worker finished");
        Ok(result)
    }
}

fn spawn_reader<R>(reader: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            if let Err(err) = reader.read_to_end(&mut buf).await {
                debug!(error = %err, "Sandbox pipe read failed");
            }
        }
        buf
    })
}

async fn drain(handle: &mut JoinHandle<Vec<u8>>) -> Vec<u8> {
    match tokio::time::timeout(IO_DRAIN_TIMEOUT, &mut *handle).await {
        Ok(Ok(buf)) => buf,
        Ok(Err(err)) => {
            warn!(error = %err, "Sandbox pipe reader failed");
            Vec::new()
        }
        Err(_) => {
            handle.abort();
            Vec::new()
        }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(pid, error = %err, "Failed to kill sandbox process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
