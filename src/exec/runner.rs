// src/exec/runner.rs

//! A single run of the database CLI.
//!
//! A [`CommandRunner`] is an unstarted command. [`CommandRunner::start`]
//! moves it onto its own Tokio task and returns a [`CommandHandle`], through
//! which the command can be observed or stopped.
//!
//! Normal completion and [`CommandHandle::stop`] race for the same atomic
//! state word. Whichever side moves it out of `Running` first decides the
//! outcome; the other side becomes a no-op. The background task always owns
//! the temp file and always invokes the callback exactly once.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::connection::Invocation;

use super::decode::outcome_from_output;
use super::{CommandOutcome, Notifier, ResultCallback, TIMEOUT_ADVISORY};

const STATE_RUNNING: u8 = 1;
const STATE_COMPLETED: u8 = 2;
const STATE_KILLED: u8 = 3;

/// How long to keep reading output after the CLI has exited. A descendant
/// that inherited stdout can hold the pipe open indefinitely.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Lifecycle of a started command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// The process finished (or failed to launch) before any stop request.
    Completed,
    /// `stop()` won the race.
    Killed,
}

#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    /// Taken by the first successful `stop()`.
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    /// Present only while the process is alive.
    pid: Mutex<Option<u32>>,
    temp_path: Mutex<Option<PathBuf>>,
    /// Flips to `true` once the callback has run and the temp file is gone.
    done: watch::Sender<bool>,
    notifier: Arc<dyn Notifier>,
    program: String,
}

impl Shared {
    fn claim(&self, target: u8) -> bool {
        self.state
            .compare_exchange(STATE_RUNNING, target, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claim completion, or confirm an earlier claim by the background task.
    fn complete(&self) -> bool {
        self.claim(STATE_COMPLETED) || self.state() == RunState::Completed
    }

    fn state(&self) -> RunState {
        match self.state.load(Ordering::Acquire) {
            STATE_COMPLETED => RunState::Completed,
            STATE_KILLED => RunState::Killed,
            _ => RunState::Running,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An external CLI run that has not been started yet.
#[derive(Debug)]
pub struct CommandRunner {
    invocation: Invocation,
    notifier: Arc<dyn Notifier>,
}

impl CommandRunner {
    pub fn new(invocation: Invocation, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            invocation,
            notifier,
        }
    }

    /// Launch the command on a background task and return immediately.
    ///
    /// `on_result` is called exactly once, from the background task: with
    /// the decoded output, with the error text, or with
    /// [`CommandOutcome::Killed`] if [`CommandHandle::stop`] won.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(self, on_result: F) -> CommandHandle
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let (done_tx, _done_rx) = watch::channel(false);
        let program = self.invocation.args.first().cloned().unwrap_or_default();

        let shared = Arc::new(Shared {
            state: AtomicU8::new(STATE_RUNNING),
            cancel: Mutex::new(Some(cancel_tx)),
            pid: Mutex::new(None),
            temp_path: Mutex::new(None),
            done: done_tx,
            notifier: self.notifier,
            program,
        });

        let handle = CommandHandle {
            shared: Arc::clone(&shared),
        };

        tokio::spawn(run_command(
            self.invocation,
            shared,
            cancel_rx,
            Box::new(on_result),
        ));

        handle
    }
}

/// Observe or stop a started command. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandHandle {
    shared: Arc<Shared>,
}

impl CommandHandle {
    /// Kill the process if it is still running.
    ///
    /// The first call that finds the command running claims it, clears the
    /// process handle, signals the background task to SIGKILL and reap the
    /// process (which then removes the temp file), and shows the timeout
    /// advisory. Any other call, including one after a natural exit, does
    /// nothing. Returns whether this call performed the stop.
    pub fn stop(&self) -> bool {
        if !self.shared.claim(STATE_KILLED) {
            debug!(
                program = %self.shared.program,
                state = ?self.shared.state(),
                "stop ignored; command is no longer running"
            );
            return false;
        }

        let pid = lock(&self.shared.pid).take();

        if let Some(cancel) = lock(&self.shared.cancel).take() {
            if cancel.send(()).is_err() {
                debug!(
                    program = %self.shared.program,
                    "command task already gone while stopping"
                );
            }
        }

        warn!(
            program = %self.shared.program,
            pid,
            "command is taking too long; process killed"
        );
        self.shared.notifier.advise(TIMEOUT_ADVISORY);
        true
    }

    pub fn state(&self) -> RunState {
        self.shared.state()
    }

    /// `true` once the callback has been invoked and resources released.
    pub fn is_finished(&self) -> bool {
        *self.shared.done.borrow()
    }

    /// Wait until [`is_finished`](Self::is_finished) holds.
    pub async fn wait(&self) {
        let mut rx = self.shared.done.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Process id while the process is alive and not stopped.
    pub fn pid(&self) -> Option<u32> {
        *lock(&self.shared.pid)
    }

    /// Path of the query file handed to the CLI as stdin.
    ///
    /// The path stays recorded after the file itself has been removed.
    pub fn temp_path(&self) -> Option<PathBuf> {
        lock(&self.shared.temp_path).clone()
    }
}

async fn run_command(
    invocation: Invocation,
    shared: Arc<Shared>,
    cancel_rx: oneshot::Receiver<()>,
    on_result: ResultCallback,
) {
    let finished = match execute(&invocation, &shared, cancel_rx).await {
        Ok(Some(outcome)) => Some(outcome),
        Ok(None) => None,
        Err(err) => {
            warn!(
                program = %shared.program,
                error = %err,
                "database cli execution error"
            );
            Some(CommandOutcome::ExternalError(format!("{err:#}")))
        }
    };

    let outcome = match finished {
        Some(outcome) if shared.complete() => outcome,
        Some(_) => {
            debug!(
                program = %shared.program,
                "process finished after stop(); discarding its output"
            );
            CommandOutcome::Killed
        }
        None => CommandOutcome::Killed,
    };

    lock(&shared.pid).take();
    on_result(outcome);
    shared.done.send_replace(true);
}

/// Returns `Ok(None)` when the process was killed by `stop()`.
async fn execute(
    invocation: &Invocation,
    shared: &Shared,
    cancel_rx: oneshot::Receiver<()>,
) -> Result<Option<CommandOutcome>> {
    if invocation.query.is_empty() {
        debug!(program = %shared.program, "empty query; nothing to run");
        return Ok(Some(CommandOutcome::Success(String::new())));
    }

    let (program, args) = invocation
        .args
        .split_first()
        .context("invocation has no executable")?;

    let query_file = write_query_file(&invocation.query)?;
    *lock(&shared.temp_path) = Some(query_file.to_path_buf());

    let result = run_process(program, args, &query_file, shared, cancel_rx).await;

    // The child has been reaped (or never started) by now.
    let path = query_file.to_path_buf();
    if let Err(e) = query_file.close() {
        warn!(path = %path.display(), error = %e, "failed to remove query file");
    }

    result
}

fn write_query_file(query: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("sqltools-")
        .suffix(".sql")
        .tempfile()
        .context("creating query file")?;
    file.write_all(query.as_bytes())
        .context("writing query file")?;
    file.flush().context("flushing query file")?;
    Ok(file.into_temp_path())
}

async fn run_process(
    program: &str,
    args: &[String],
    query_file: &Path,
    shared: &Shared,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<Option<CommandOutcome>> {
    let stdin = std::fs::File::open(query_file)
        .with_context(|| format!("opening query file {}", query_file.display()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to launch '{program}'"))?;

    let pid = child.id();
    *lock(&shared.pid) = pid;
    debug!(program, pid, "database cli started");

    // Drain both pipes concurrently so a chatty CLI cannot block on a full
    // buffer while we wait for it.
    let stdout_buf = Arc::new(Mutex::new(Vec::new()));
    let stderr_buf = Arc::new(Mutex::new(Vec::new()));
    let mut stdout = tokio::spawn(read_stream(child.stdout.take(), Arc::clone(&stdout_buf)));
    let mut stderr = tokio::spawn(read_stream(child.stderr.take(), Arc::clone(&stderr_buf)));

    tokio::select! {
        status = child.wait() => {
            let status = status.with_context(|| format!("waiting for '{program}'"))?;

            // From here on stop() is a no-op.
            if !shared.complete() {
                stdout.abort();
                stderr.abort();
                debug!(program, pid, "process exited after stop(); discarding its output");
                return Ok(None);
            }
            lock(&shared.pid).take();

            let drained = tokio::time::timeout(OUTPUT_DRAIN_GRACE, async {
                let _ = tokio::join!(&mut stdout, &mut stderr);
            })
            .await;
            if drained.is_err() {
                debug!(program, pid, "output still open after exit; keeping what was read");
            }
            stdout.abort();
            stderr.abort();

            let stdout = std::mem::take(&mut *lock(&stdout_buf));
            let stderr = std::mem::take(&mut *lock(&stderr_buf));

            debug!(
                program,
                pid,
                exit_code = status.code().unwrap_or(-1),
                stdout_bytes = stdout.len(),
                stderr_bytes = stderr.len(),
                "database cli exited"
            );

            Ok(Some(outcome_from_output(&stdout, &stderr)))
        }

        Ok(()) = &mut cancel_rx => {
            if let Err(e) = child.kill().await {
                debug!(program, pid, error = %e, "kill failed; process already gone");
            }
            stdout.abort();
            stderr.abort();
            info!(program, pid, "database cli killed");
            Ok(None)
        }
    }
}

/// Copy `stream` into `sink` chunk by chunk, so whatever arrived is
/// available even if the reader is aborted.
async fn read_stream<R>(stream: Option<R>, sink: Arc<Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
            Err(e) => {
                debug!(error = %e, "error reading cli output; keeping what was read");
                break;
            }
        }
    }
}
