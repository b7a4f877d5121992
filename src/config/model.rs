// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::KeywordCase;

/// Default watchdog timeout in milliseconds.
pub const DEFAULT_THREAD_TIMEOUT_MS: u64 = 5000;
/// Default number of queries kept in the session history.
pub const DEFAULT_HISTORY_SIZE: usize = 100;
/// Default row limit for `show records`.
pub const DEFAULT_ROWS_LIMIT: u64 = 50;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [settings]
/// thread_timeout = 5000
/// default_connection = "local"
///
/// [cli]
/// pgsql = "psql"
///
/// [kinds.pgsql]
/// args = "-h {host} -p {port} -U {username} -d {database}"
///
/// [kinds.pgsql.queries.desc]
/// query = "select table_name from information_schema.tables"
/// options = ["-t"]
///
/// [connections.local]
/// type = "pgsql"
/// host = "localhost"
/// port = 5432
/// username = "postgres"
/// database = "postgres"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub settings: Settings,

    /// CLI executable per database type (`pgsql = "psql"`).
    #[serde(default)]
    pub cli: BTreeMap<String, String>,

    /// Per database type: args template, preamble and query templates.
    #[serde(default)]
    pub kinds: BTreeMap<String, KindConfig>,

    /// Named connections from `[connections.<name>]`.
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: Settings,
    pub cli: BTreeMap<String, String>,
    pub kinds: BTreeMap<String, KindConfig>,
    pub connections: BTreeMap<String, ConnectionConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            settings: raw.settings,
            cli: raw.cli,
            kinds: raw.kinds,
            connections: raw.connections,
        }
    }
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Watchdog timeout for a single command, in milliseconds.
    #[serde(default = "default_thread_timeout")]
    pub thread_timeout: u64,

    /// Capacity of the per-session query history.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// File extensions (without the dot) for which `\"` and `\'` are
    /// un-escaped before a query is executed.
    #[serde(default)]
    pub unescape_quotes: Vec<String>,

    /// Turns on debug logging when no `--log-level` / `SQLTOOLS_LOG` is set.
    #[serde(default)]
    pub debug: bool,

    /// Connection used when `--connection` is not given.
    #[serde(default)]
    pub default_connection: Option<String>,

    /// Saved queries file, relative to the config file's directory.
    #[serde(default = "default_saved_queries")]
    pub saved_queries: PathBuf,

    #[serde(default)]
    pub show_records: ShowRecordsSettings,

    #[serde(default)]
    pub format: FormatSettings,
}

fn default_thread_timeout() -> u64 {
    DEFAULT_THREAD_TIMEOUT_MS
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

fn default_saved_queries() -> PathBuf {
    PathBuf::from("SQLToolsSavedQueries.toml")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thread_timeout: default_thread_timeout(),
            history_size: default_history_size(),
            unescape_quotes: Vec::new(),
            debug: false,
            default_connection: None,
            saved_queries: default_saved_queries(),
            show_records: ShowRecordsSettings::default(),
            format: FormatSettings::default(),
        }
    }
}

/// `[settings.show_records]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowRecordsSettings {
    #[serde(default = "default_rows_limit")]
    pub limit: u64,
}

fn default_rows_limit() -> u64 {
    DEFAULT_ROWS_LIMIT
}

impl Default for ShowRecordsSettings {
    fn default() -> Self {
        Self {
            limit: default_rows_limit(),
        }
    }
}

/// `[settings.format]` section, consumed by [`crate::format`].
#[derive(Debug, Clone, Deserialize)]
pub struct FormatSettings {
    #[serde(default)]
    pub keyword_case: KeywordCase,

    #[serde(default = "default_indent_width")]
    pub indent_width: u8,

    #[serde(default)]
    pub indent_tabs: bool,

    #[serde(default = "default_lines_between_queries")]
    pub lines_between_queries: u8,

    /// Append a trailing newline to formatted output.
    #[serde(default)]
    pub ensure_newline_at_eof: bool,
}

fn default_indent_width() -> u8 {
    4
}

fn default_lines_between_queries() -> u8 {
    1
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            keyword_case: KeywordCase::default(),
            indent_width: default_indent_width(),
            indent_tabs: false,
            lines_between_queries: default_lines_between_queries(),
            ensure_newline_at_eof: false,
        }
    }
}

/// `[kinds.<type>]` section: how to talk to one kind of database CLI.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KindConfig {
    /// Argument template, rendered with connection fields and then split
    /// with shell quoting rules (e.g. `"-h {host} -U {username}"`).
    #[serde(default)]
    pub args: String,

    /// Queries prepended to every arbitrary execution.
    #[serde(default)]
    pub before: Vec<String>,

    /// Query templates keyed by name (`desc`, `columns`, `show records`,
    /// `desc table`).
    #[serde(default)]
    pub queries: BTreeMap<String, QueryTemplate>,
}

/// One query template plus the extra CLI flags it needs.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct QueryTemplate {
    pub query: String,

    /// Flags inserted right after the executable when this query runs.
    #[serde(default)]
    pub options: Vec<String>,
}

/// `[connections.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Database type; selects `[cli]` and `[kinds.<type>]` entries.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub service: Option<String>,

    /// Any other keys (`sid = "ORCL"`); available to the `args` template.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}
