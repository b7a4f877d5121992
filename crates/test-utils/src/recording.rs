use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use sqltools::exec::{CommandOutcome, Notifier};

/// A notifier that records every advisory instead of printing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn advise(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Collects every outcome handed to the callbacks it creates.
///
/// Uses an unbounded channel rather than a oneshot so tests can assert a
/// callback was invoked exactly once: a second invocation shows up as a
/// second message.
pub struct OutcomeRecorder<T = String> {
    tx: mpsc::UnboundedSender<CommandOutcome<T>>,
    rx: mpsc::UnboundedReceiver<CommandOutcome<T>>,
}

impl<T: Send + 'static> OutcomeRecorder<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// A callback that forwards its outcome into this recorder.
    pub fn callback(&self) -> impl FnOnce(CommandOutcome<T>) + Send + use<T> {
        let tx = self.tx.clone();
        move |outcome| {
            let _ = tx.send(outcome);
        }
    }

    /// Wait (up to 5s) for the next outcome.
    pub async fn next(&mut self) -> CommandOutcome<T> {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.rx.recv())
            .await
            .expect("timed out waiting for command outcome")
            .expect("outcome channel closed")
    }

    /// Outcomes received so far, without waiting.
    pub fn drain(&mut self) -> Vec<CommandOutcome<T>> {
        let mut out = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            out.push(outcome);
        }
        out
    }
}

impl<T: Send + 'static> Default for OutcomeRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
