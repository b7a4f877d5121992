// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `sqltools`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sqltools",
    version,
    about = "Run SQL through your database's own command-line client.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `SQLTools.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path(), global = true)]
    pub config: PathBuf,

    /// Connection to use. Falls back to `[settings].default_connection`.
    #[arg(long, short = 'c', value_name = "NAME", global = true)]
    pub connection: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SQLTOOLS_LOG`, then `[settings].debug`, then `info`
    /// is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List configured connections.
    Connections,

    /// List tables.
    Tables,

    /// List columns.
    Columns,

    /// Show the first rows of a table (`[settings.show_records].limit`).
    Records { table: String },

    /// Describe a table.
    Desc { table: String },

    /// Execute SQL. Reads QUERY arguments, else `--file`, else stdin.
    Exec {
        /// One or more queries, run in order in a single CLI invocation.
        queries: Vec<String>,

        /// Read the SQL from this file.
        #[arg(long, value_name = "PATH", conflicts_with = "queries")]
        file: Option<PathBuf>,

        /// Extension of the originating document, for quote un-escaping.
        /// Defaults to the extension of `--file`.
        #[arg(long, value_name = "EXT")]
        extension: Option<String>,
    },

    /// Pretty-print SQL from `--file` or stdin.
    Format {
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Save a query under an alias.
    Save {
        alias: String,
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List saved queries.
    Saved,

    /// Execute a saved query.
    RunSaved { alias: String },

    /// Interactive shell reading SQL and `:commands` from stdin.
    Shell,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
