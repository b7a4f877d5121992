// src/exec/watchdog.rs

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::CommandHandle;

/// Deadline timer for one command.
///
/// After `timeout` the watchdog calls [`CommandHandle::stop`]. It disarms
/// itself as soon as the command finishes, so no timer outlives its
/// command. Dropping the `Watchdog` leaves it armed; use [`disarm`] to
/// cancel it explicitly.
///
/// [`disarm`]: Watchdog::disarm
#[derive(Debug)]
pub struct Watchdog {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Watchdog {
    pub fn arm(timeout: Duration, command: CommandHandle) -> Self {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    if command.stop() {
                        info!(timeout_ms = timeout.as_millis() as u64, "watchdog fired");
                    }
                }
                _ = command.wait() => {
                    debug!("command finished before its deadline; watchdog disarmed");
                }
                Ok(()) = &mut cancel_rx => {
                    debug!("watchdog cancelled");
                }
            }
        });

        Self {
            cancel: Some(cancel_tx),
            handle,
        }
    }

    /// Cancel the timer without touching the command.
    pub fn disarm(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// `true` once the timer has fired, been cancelled, or seen the command
    /// finish.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
