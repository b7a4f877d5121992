// src/exec/notifier.rs

//! User-facing advisories.
//!
//! The runner never prints directly; it talks to a `Notifier`. The binary
//! uses [`ConsoleNotifier`]; tests install one that records messages.

use std::fmt::Debug;

/// Shown once when the watchdog kills a command.
pub const TIMEOUT_ADVISORY: &str =
    "Your command is taking too long to run. Try to run outside using your database cli.";

pub trait Notifier: Send + Sync + Debug {
    /// Surface a one-off message to the user.
    fn advise(&self, message: &str);
}

/// Writes advisories to stderr, next to the log output.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn advise(&self, message: &str) {
        eprintln!("sqltools: {message}");
    }
}
