// src/lib.rs

pub mod cli;
pub mod config;
pub mod connection;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod format;
pub mod history;
pub mod logging;
pub mod session;
pub mod shell;
pub mod storage;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::model::ConfigFile;
use crate::connection::{ConnectionDescriptor, Invocation};
use crate::exec::{CommandHandle, CommandOutcome, ConsoleNotifier};
use crate::session::Session;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the validated config and the session built from it
/// - connection selection
/// - the scheduler / runner / watchdog for each request
/// - result printing
pub async fn run(args: CliArgs, cfg: ConfigFile) -> Result<()> {
    let session = Session::new(cfg, &args.config, Arc::new(ConsoleNotifier))?;
    let name = args.connection.as_deref();

    match args.command {
        CliCommand::Connections => {
            print_connections(&session);
            Ok(())
        }
        CliCommand::Format { file } => {
            let raw = read_input(file.as_deref()).await?;
            print!("{}", session.format(&raw));
            Ok(())
        }
        CliCommand::Save { alias, query } => {
            let mut saved = session.saved_queries()?;
            if saved.save(&alias, query.join("\n"))? {
                info!(alias = %alias, path = %saved.path().display(), "query saved");
            }
            Ok(())
        }
        CliCommand::Saved => {
            let saved = session.saved_queries()?;
            for (alias, query) in saved.iter() {
                println!("{alias}: {}", query.replace('\n', " "));
            }
            Ok(())
        }
        CliCommand::Tables => list_tables(&session, session.connection(name)?).await,
        CliCommand::Columns => list_columns(&session, session.connection(name)?).await,
        CliCommand::Records { table } => {
            table_records(&session, session.connection(name)?, &table).await
        }
        CliCommand::Desc { table } => {
            describe_table(&session, session.connection(name)?, &table).await
        }
        CliCommand::Exec {
            queries,
            file,
            extension,
        } => {
            let conn = session.connection(name)?;
            let extension = extension.or_else(|| {
                file.as_deref()
                    .and_then(Path::extension)
                    .map(|ext| ext.to_string_lossy().into_owned())
            });
            let queries = if queries.is_empty() {
                vec![read_input(file.as_deref()).await?]
            } else {
                queries
            };
            execute(&session, conn, queries, extension).await
        }
        CliCommand::RunSaved { alias } => {
            let conn = session.connection(name)?;
            let query = session.saved_queries()?.get(&alias)?.to_string();
            execute(&session, conn, vec![query], None).await
        }
        CliCommand::Shell => {
            let conn = session.connection(name)?;
            debug!(connection = %conn, "starting shell");
            shell::run_shell(&session, conn).await
        }
    }
}

/// Start a command through `start` and wait for its single outcome.
async fn await_outcome<T, S>(start: S) -> Result<CommandOutcome<T>>
where
    T: Send + 'static,
    S: FnOnce(oneshot::Sender<CommandOutcome<T>>) -> errors::Result<CommandHandle>,
{
    let (tx, rx) = oneshot::channel();
    let _handle = start(tx)?;
    rx.await
        .context("command finished without reporting a result")
}

pub(crate) async fn list_tables(session: &Session, conn: &ConnectionDescriptor) -> Result<()> {
    let outcome = await_outcome(|tx| {
        session.scheduler().list_tables(conn, move |outcome| {
            let _ = tx.send(outcome);
        })
    })
    .await?;
    report_list(outcome, session)
}

pub(crate) async fn list_columns(session: &Session, conn: &ConnectionDescriptor) -> Result<()> {
    let outcome = await_outcome(|tx| {
        session.scheduler().list_columns(conn, move |outcome| {
            let _ = tx.send(outcome);
        })
    })
    .await?;
    report_list(outcome, session)
}

pub(crate) async fn table_records(
    session: &Session,
    conn: &ConnectionDescriptor,
    table: &str,
) -> Result<()> {
    let outcome = await_outcome(|tx| {
        session.scheduler().table_records(conn, table, move |outcome| {
            let _ = tx.send(outcome);
        })
    })
    .await?;
    report_text(outcome, session)
}

pub(crate) async fn describe_table(
    session: &Session,
    conn: &ConnectionDescriptor,
    table: &str,
) -> Result<()> {
    let outcome = await_outcome(|tx| {
        session.scheduler().describe_table(conn, table, move |outcome| {
            let _ = tx.send(outcome);
        })
    })
    .await?;
    report_text(outcome, session)
}

pub(crate) async fn execute(
    session: &Session,
    conn: &ConnectionDescriptor,
    queries: Vec<String>,
    file_extension: Option<String>,
) -> Result<()> {
    let outcome = await_outcome(|tx| {
        session
            .scheduler()
            .execute(conn, queries, file_extension, move |outcome| {
                let _ = tx.send(outcome);
            })
    })
    .await?;
    report_text(outcome, session)
}

/// Run a query text exactly as recorded in history (preamble included).
pub(crate) async fn rerun(
    session: &Session,
    conn: &ConnectionDescriptor,
    query: String,
) -> Result<()> {
    let invocation = Invocation::new(conn.build_args(None)?, query);
    session.history().push(invocation.query.clone());

    let (tx, rx) = oneshot::channel();
    let _handle = session.scheduler().run(invocation, move |outcome| {
        let _ = tx.send(outcome);
    });
    let outcome = rx
        .await
        .context("command finished without reporting a result")?;
    report_text(outcome, session)
}

fn report_text(outcome: CommandOutcome, session: &Session) -> Result<()> {
    match outcome {
        CommandOutcome::Success(text) => {
            print!("{text}");
            if !text.is_empty() && !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        other => report_failure(other.map(|_| ()), session),
    }
}

fn report_list(outcome: CommandOutcome<Vec<String>>, session: &Session) -> Result<()> {
    match outcome {
        CommandOutcome::Success(names) => {
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        other => report_failure(other.map(|_| ()), session),
    }
}

fn report_failure(outcome: CommandOutcome<()>, session: &Session) -> Result<()> {
    match outcome {
        CommandOutcome::Success(()) => Ok(()),
        CommandOutcome::ExternalError(text) => {
            eprint!("{text}");
            if !text.ends_with('\n') {
                eprintln!();
            }
            Err(anyhow!("the database cli reported an error"))
        }
        CommandOutcome::Killed => bail!(
            "command killed after {} ms",
            session.config().settings.thread_timeout
        ),
    }
}

/// Read SQL from a file, or from stdin when no file is given.
async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading SQL from stdin")?;
            Ok(buf)
        }
    }
}

fn print_connections(session: &Session) {
    let default = session.config().settings.default_connection.as_deref();
    for conn in session.connections() {
        let marker = if Some(conn.name.as_str()) == default { "*" } else { " " };
        println!("{marker} {:<20} {}", conn.name, conn.info());
    }
}
