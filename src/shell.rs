// src/shell.rs

//! Interactive shell: one line per request, read from stdin.
//!
//! Lines starting with `:` are shell commands; anything else is SQL and is
//! executed against the selected connection (and recorded in history).

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::connection::ConnectionDescriptor;
use crate::session::Session;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Quit,
    Help,
    Tables,
    Columns,
    Describe(String),
    Records(String),
    History,
    /// Re-run the history entry at this index.
    Rerun(usize),
    Sql(String),
}

pub const SHELL_HELP: &str = "\
:tables          list tables
:columns         list columns
:desc TABLE      describe a table
:records TABLE   show the first rows of a table
:history         list executed queries
:run N           execute history entry N again
:quit            leave the shell
anything else is executed as SQL";

impl ShellCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellCommand::Empty);
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Ok(ShellCommand::Sql(line.to_string()));
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match (name, arg) {
            ("q" | "quit" | "exit", None) => Ok(ShellCommand::Quit),
            ("h" | "help", None) => Ok(ShellCommand::Help),
            ("tables", None) => Ok(ShellCommand::Tables),
            ("columns", None) => Ok(ShellCommand::Columns),
            ("history", None) => Ok(ShellCommand::History),
            ("desc", Some(table)) => Ok(ShellCommand::Describe(table.to_string())),
            ("records", Some(table)) => Ok(ShellCommand::Records(table.to_string())),
            ("run", Some(index)) => index
                .parse::<usize>()
                .map(ShellCommand::Rerun)
                .map_err(|_| format!("not a history index: {index}")),
            ("desc" | "records" | "run", None) => Err(format!(":{name} needs an argument")),
            (other, _) => Err(format!("unknown command :{other} (try :help)")),
        }
    }
}

/// Run the shell until `:quit` or end of input.
pub async fn run_shell(session: &Session, conn: &ConnectionDescriptor) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    eprintln!("connected to {} ({}); :help for commands", conn, conn.info());

    loop {
        stderr.write_all(b"sqltools> ").await?;
        stderr.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        debug!(?command, "shell command");

        if let Err(err) = run_shell_command(session, conn, command.clone()).await {
            eprintln!("{err:#}");
        }

        if command == ShellCommand::Quit {
            break;
        }
    }

    Ok(())
}

async fn run_shell_command(
    session: &Session,
    conn: &ConnectionDescriptor,
    command: ShellCommand,
) -> Result<()> {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => Ok(()),
        ShellCommand::Help => {
            println!("{SHELL_HELP}");
            Ok(())
        }
        ShellCommand::History => {
            for (i, query) in session.history().entries().iter().enumerate() {
                println!("{i:>4}  {}", query.replace('\n', " "));
            }
            Ok(())
        }
        ShellCommand::Tables => crate::list_tables(session, conn).await,
        ShellCommand::Columns => crate::list_columns(session, conn).await,
        ShellCommand::Describe(table) => crate::describe_table(session, conn, &table).await,
        ShellCommand::Records(table) => crate::table_records(session, conn, &table).await,
        ShellCommand::Rerun(index) => {
            let query = session.history().get(index)?;
            crate::rerun(session, conn, query).await
        }
        ShellCommand::Sql(query) => crate::execute(session, conn, vec![query], None).await,
    }
}
