// src/connection/invocation.rs

use crate::connection::template::{render_percent, render_positional};
use crate::connection::ConnectionDescriptor;
use crate::errors::Result;
use crate::types::QueryName;

/// A request the scheduler knows how to turn into a CLI run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListTables,
    ListColumns,
    TableRecords { table: String },
    DescribeTable { table: String },
    /// Arbitrary SQL. `file_extension` is the extension of the document the
    /// queries came from, if any; it drives quote un-escaping.
    Execute {
        queries: Vec<String>,
        file_extension: Option<String>,
    },
}

impl Operation {
    /// Execute a single query string.
    pub fn execute(query: impl Into<String>) -> Self {
        Operation::Execute {
            queries: vec![query.into()],
            file_extension: None,
        }
    }

    /// The named template this operation uses, if any.
    pub fn query_name(&self) -> Option<QueryName> {
        match self {
            Operation::ListTables => Some(QueryName::Tables),
            Operation::ListColumns => Some(QueryName::Columns),
            Operation::TableRecords { .. } => Some(QueryName::ShowRecords),
            Operation::DescribeTable { .. } => Some(QueryName::DescTable),
            Operation::Execute { .. } => None,
        }
    }
}

/// Argument list plus the query text for one run of the external CLI.
///
/// `args[0]` is the executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub query: String,
}

impl Invocation {
    pub fn new(args: Vec<String>, query: impl Into<String>) -> Self {
        Self {
            args,
            query: query.into(),
        }
    }

    /// Build the invocation for `op` against `conn`.
    ///
    /// `unescape_extensions` is the `unescape_quotes` allow-list; it only
    /// matters for [`Operation::Execute`].
    pub fn for_operation(
        conn: &ConnectionDescriptor,
        op: &Operation,
        unescape_extensions: &[String],
    ) -> Result<Self> {
        let args = conn.build_args(op.query_name())?;

        let query = match op {
            Operation::ListTables => conn.query(QueryName::Tables)?.query.clone(),
            Operation::ListColumns => conn.query(QueryName::Columns)?.query.clone(),
            Operation::TableRecords { table } => {
                let template = &conn.query(QueryName::ShowRecords)?.query;
                let limit = conn.rows_limit.to_string();
                render_positional(template, &[table.as_str(), limit.as_str()])?
            }
            Operation::DescribeTable { table } => {
                render_percent(&conn.query(QueryName::DescTable)?.query, table)
            }
            Operation::Execute {
                queries,
                file_extension,
            } => {
                let text = join_queries(&conn.before, queries);
                if should_unescape(file_extension.as_deref(), unescape_extensions) {
                    unescape_quotes(&text)
                } else {
                    text
                }
            }
        };

        Ok(Self { args, query })
    }
}

/// Preamble queries then user queries, one per line, trailing newlines trimmed.
pub fn join_queries(before: &[String], queries: &[String]) -> String {
    let mut text = String::new();
    for query in before.iter().chain(queries.iter()) {
        text.push_str(query);
        text.push('\n');
    }
    text.trim_end_matches('\n').to_string()
}

/// Whether queries from a document with this extension get un-escaped.
pub fn should_unescape(file_extension: Option<&str>, allow_list: &[String]) -> bool {
    let Some(ext) = file_extension else {
        return false;
    };
    let ext = ext.trim_start().trim_start_matches('.');
    allow_list.iter().any(|allowed| allowed == ext)
}

/// `\"` → `"` and `\'` → `'`.
pub fn unescape_quotes(text: &str) -> String {
    text.replace("\\\"", "\"").replace("\\'", "'")
}
