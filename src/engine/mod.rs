// src/engine/mod.rs

//! Orchestration engine for sqltools.
//!
//! This module ties together:
//! - connection descriptors (what to run, with which arguments)
//! - the command runner (how a run happens)
//! - the watchdog (when a run is cut short)
//! - the session history
//!
//! The request-to-invocation logic and the watchdog arming live in
//! [`scheduler`]; post-processing of tabular CLI output lives in
//! [`results`].

pub mod results;
pub mod scheduler;

pub use results::result_as_list;
pub use scheduler::{ExecutionScheduler, SchedulerOptions};
