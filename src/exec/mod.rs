// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the database CLI, using
//! `tokio::process::Command`, and handing the decoded result back through a
//! callback.
//!
//! - [`runner`] owns one external process: temp file, spawn, wait, kill.
//! - [`decode`] turns captured bytes into a [`CommandOutcome`].
//! - [`watchdog`] kills a command that outlives its deadline.
//! - [`notifier`] provides the `Notifier` trait through which the kill
//!   advisory reaches the user, and which tests replace with a recorder.

pub mod decode;
pub mod notifier;
pub mod runner;
pub mod watchdog;

pub use decode::{decode_output, outcome_from_output};
pub use notifier::{ConsoleNotifier, Notifier, TIMEOUT_ADVISORY};
pub use runner::{CommandHandle, CommandRunner, RunState};
pub use watchdog::Watchdog;

/// Result of one external command.
///
/// `T` is the success payload: decoded stdout for plain queries, a list of
/// names for `list tables` / `list columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome<T = String> {
    /// The CLI exited without writing to stderr.
    Success(T),
    /// The CLI wrote to stderr (or could not be launched); carries the
    /// decoded error text.
    ExternalError(String),
    /// The watchdog killed the process before it finished.
    Killed,
}

impl<T> CommandOutcome<T> {
    pub fn map<U, F>(self, f: F) -> CommandOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            CommandOutcome::Success(value) => CommandOutcome::Success(f(value)),
            CommandOutcome::ExternalError(text) => CommandOutcome::ExternalError(text),
            CommandOutcome::Killed => CommandOutcome::Killed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            CommandOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Callback receiving the outcome of a plain query.
pub type ResultCallback = Box<dyn FnOnce(CommandOutcome) + Send + 'static>;

