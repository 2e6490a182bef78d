//! Capability-abstracted external-process execution.
//!
//! Adapters depend on [`ProcessRunner`] rather than `std::process` directly,
//! so tests can substitute scripted runners. [`SystemRunner`] is the real
//! implementation: sequential, one child at a time, with an optional
//! wall-clock budget enforced by polling and killing the child.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured outcome of one child process.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs an external program and captures its output.
pub trait ProcessRunner {
    /// Execute `program` with `args`, waiting at most `timeout` when given.
    ///
    /// A timeout terminates the child and yields `timed_out = true`; it is
    /// not an `Err`. `Err` is reserved for spawn and wait failures.
    fn run(&self, program: &Path, args: &[String], timeout: Option<Duration>)
        -> io::Result<RunOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

/// Drain a pipe on a background thread to avoid buffer deadlock while the
/// parent polls for exit.
fn drain_pipe<R: Read + Send + 'static>(pipe: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut pipe = pipe;
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Poll for exit within `timeout`; `None` means the child was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None if start.elapsed() >= timeout => {
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> io::Result<RunOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                io::Error::new(e.kind(), format!("spawn {}: {e}", program.display()))
            })?;

        let stdout_thread = child.stdout.take().map(drain_pipe);
        let stderr_thread = child.stderr.take().map(drain_pipe);

        let (exit_code, timed_out) = match timeout {
            Some(budget) => match wait_with_timeout(&mut child, budget)? {
                Some(status) => (status.code(), false),
                None => (None, true),
            },
            None => (child.wait()?.code(), false),
        };

        let stdout = stdout_thread
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();
        let stderr = stderr_thread
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();

        Ok(RunOutput {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}
