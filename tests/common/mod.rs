#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sqltools::connection::Invocation;
use sqltools::engine::{ExecutionScheduler, SchedulerOptions};
use sqltools::exec::{CommandHandle, CommandRunner};
use sqltools::history::HistoryBuffer;

pub use sqltools_test_utils::init_tracing;
use sqltools_test_utils::recording::{OutcomeRecorder, RecordingNotifier};

/// `sh -c <script>` with `query` as the contents of its stdin file.
pub fn sh(script: &str, query: &str) -> Invocation {
    Invocation::new(
        vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        query,
    )
}

/// Start `invocation` without a watchdog.
pub fn start(
    invocation: Invocation,
    notifier: &RecordingNotifier,
    recorder: &OutcomeRecorder,
) -> CommandHandle {
    CommandRunner::new(invocation, Arc::new(notifier.clone())).start(recorder.callback())
}

/// Scheduler with the given watchdog timeout and history capacity.
pub fn scheduler(timeout: Duration, history: usize, notifier: &RecordingNotifier) -> ExecutionScheduler {
    let options = SchedulerOptions {
        timeout,
        unescape_extensions: vec!["php".to_string()],
    };
    ExecutionScheduler::new(options, HistoryBuffer::new(history), Arc::new(notifier.clone()))
}

/// Poll until the command reports a pid.
pub async fn wait_for_pid(handle: &CommandHandle) -> u32 {
    for _ in 0..200 {
        if let Some(pid) = handle.pid() {
            return pid;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("command never reported a pid");
}
