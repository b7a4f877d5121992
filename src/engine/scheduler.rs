// src/engine/scheduler.rs

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::model::Settings;
use crate::connection::{ConnectionDescriptor, Invocation, Operation};
use crate::errors::Result;
use crate::exec::{CommandHandle, CommandOutcome, CommandRunner, Notifier, Watchdog};
use crate::history::HistoryBuffer;

use super::results::result_as_list;

/// Knobs the scheduler takes from `[settings]`.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Watchdog deadline per command.
    pub timeout: Duration,
    /// Extensions whose documents get `\"` / `\'` un-escaped.
    pub unescape_extensions: Vec<String>,
}

impl SchedulerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.thread_timeout),
            unescape_extensions: settings.unescape_quotes.clone(),
        }
    }
}

/// Turns user requests into CLI runs.
///
/// Every request becomes an [`Invocation`], which is handed to a fresh
/// [`CommandRunner`] and guarded by a [`Watchdog`]. Nothing here blocks:
/// results arrive through the callbacks, on the command's own task.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct ExecutionScheduler {
    options: SchedulerOptions,
    history: HistoryBuffer,
    notifier: Arc<dyn Notifier>,
}

impl ExecutionScheduler {
    pub fn new(options: SchedulerOptions, history: HistoryBuffer, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            options,
            history,
            notifier,
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Table names, from the `desc` query.
    pub fn list_tables<F>(&self, conn: &ConnectionDescriptor, on_list: F) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome<Vec<String>>) + Send + 'static,
    {
        self.submit(conn, Operation::ListTables, move |outcome| {
            on_list(outcome.map(|text| result_as_list(&text)))
        })
    }

    /// Column names, from the `columns` query.
    pub fn list_columns<F>(&self, conn: &ConnectionDescriptor, on_list: F) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome<Vec<String>>) + Send + 'static,
    {
        self.submit(conn, Operation::ListColumns, move |outcome| {
            on_list(outcome.map(|text| result_as_list(&text)))
        })
    }

    /// First `rows_limit` rows of `table`.
    pub fn table_records<F>(
        &self,
        conn: &ConnectionDescriptor,
        table: &str,
        on_result: F,
    ) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let op = Operation::TableRecords {
            table: table.to_string(),
        };
        self.submit(conn, op, on_result)
    }

    pub fn describe_table<F>(
        &self,
        conn: &ConnectionDescriptor,
        table: &str,
        on_result: F,
    ) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let op = Operation::DescribeTable {
            table: table.to_string(),
        };
        self.submit(conn, op, on_result)
    }

    /// Run arbitrary SQL, preceded by the connection's `before` queries.
    pub fn execute<F>(
        &self,
        conn: &ConnectionDescriptor,
        queries: Vec<String>,
        file_extension: Option<String>,
        on_result: F,
    ) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let op = Operation::Execute {
            queries,
            file_extension,
        };
        self.submit(conn, op, on_result)
    }

    /// Build the invocation for `op` and run it.
    ///
    /// Arbitrary executions are recorded in the session history before the
    /// process starts.
    pub fn submit<F>(
        &self,
        conn: &ConnectionDescriptor,
        op: Operation,
        on_result: F,
    ) -> Result<CommandHandle>
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let invocation = Invocation::for_operation(conn, &op, &self.options.unescape_extensions)?;

        if let Operation::Execute { .. } = op {
            debug!(connection = %conn, query = %invocation.query, "executing query");
            self.history.push(invocation.query.clone());
        }

        debug!(
            connection = %conn,
            operation = ?op.query_name(),
            args = invocation.args.len(),
            "scheduling command"
        );

        Ok(self.run(invocation, on_result))
    }

    /// Start `invocation` and arm a watchdog against it.
    pub fn run<F>(&self, invocation: Invocation, on_result: F) -> CommandHandle
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let runner = CommandRunner::new(invocation, Arc::clone(&self.notifier));
        let handle = runner.start(on_result);

        // The watchdog disarms itself when the command finishes first.
        let _watchdog = Watchdog::arm(self.options.timeout, handle.clone());

        handle
    }
}
