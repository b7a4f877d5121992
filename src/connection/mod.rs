// src/connection/mod.rs

//! Connection descriptors and the invocations derived from them.
//!
//! - [`template`] holds the pure template/argument helpers.
//! - [`invocation`] turns a descriptor plus an [`Operation`] into the
//!   argument list and query text for one CLI run.

pub mod invocation;
pub mod template;

pub use invocation::{Invocation, Operation};

use std::collections::BTreeMap;
use std::fmt;

use crate::config::model::{ConfigFile, QueryTemplate};
use crate::errors::{Result, SqlToolsError};
use crate::types::QueryName;

/// Everything needed to reach and query one named database.
///
/// Built once per connection when the configuration is loaded and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub name: String,
    pub kind: String,
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub database: String,
    pub password: Option<String>,
    pub service: Option<String>,
    /// Extra `[connections.<name>]` keys with scalar values, as text.
    pub extra: BTreeMap<String, String>,
    /// Executable of the database CLI (`[cli].<kind>`).
    pub cli_path: String,
    /// `[kinds.<kind>].args`
    pub args_template: String,
    /// `[kinds.<kind>].before`
    pub before: Vec<String>,
    pub queries: BTreeMap<String, QueryTemplate>,
    /// Row limit for `show records`.
    pub rows_limit: u64,
}

impl ConnectionDescriptor {
    /// Build the descriptor for connection `name` from a validated config.
    pub fn from_config(cfg: &ConfigFile, name: &str) -> Result<Self> {
        let conn = cfg
            .connections
            .get(name)
            .ok_or_else(|| SqlToolsError::UnknownConnection(name.to_string()))?;

        // Presence of both entries is guaranteed by validation, but the
        // config fields are public so check anyway.
        let cli_path = cfg.cli.get(&conn.kind).ok_or_else(|| {
            SqlToolsError::ConfigError(format!("no [cli] entry for type '{}'", conn.kind))
        })?;
        let kind = cfg.kinds.get(&conn.kind).ok_or_else(|| {
            SqlToolsError::ConfigError(format!("no [kinds.{}] section", conn.kind))
        })?;

        Ok(Self {
            name: name.to_string(),
            kind: conn.kind.clone(),
            host: conn.host.clone(),
            port: conn.port,
            username: conn.username.clone(),
            database: conn.database.clone(),
            password: conn.password.clone(),
            service: conn.service.clone(),
            extra: conn
                .extra
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), scalar_text(value)?)))
                .collect(),
            cli_path: cli_path.clone(),
            args_template: kind.args.clone(),
            before: kind.before.clone(),
            queries: kind.queries.clone(),
            rows_limit: cfg.settings.show_records.limit,
        })
    }

    /// Descriptors for every configured connection, keyed by name.
    pub fn all_from_config(cfg: &ConfigFile) -> Result<BTreeMap<String, Self>> {
        cfg.connections
            .keys()
            .map(|name| Ok((name.clone(), Self::from_config(cfg, name)?)))
            .collect()
    }

    /// One-line summary used when listing connections.
    pub fn info(&self) -> String {
        let port = self.port.map(|p| p.to_string()).unwrap_or_default();
        format!(
            "DB: {}, Connection: {}@{}:{}",
            self.database, self.username, self.host, port
        )
    }

    /// Values available to the `args` template.
    ///
    /// Optional fields that are not set are left out, so referencing them is
    /// reported as a template error instead of silently rendering "".
    /// Extra connection keys are included; built-in fields take precedence.
    pub fn template_fields(&self) -> BTreeMap<&str, String> {
        let mut fields: BTreeMap<&str, String> = self
            .extra
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();
        fields.insert("name", self.name.clone());
        fields.insert("type", self.kind.clone());
        fields.insert("host", self.host.clone());
        fields.insert("username", self.username.clone());
        fields.insert("database", self.database.clone());
        if let Some(port) = self.port {
            fields.insert("port", port.to_string());
        }
        if let Some(ref password) = self.password {
            fields.insert("password", password.clone());
        }
        if let Some(ref service) = self.service {
            fields.insert("service", service.clone());
        }
        fields
    }

    /// Look up a built-in query template for this connection's type.
    pub fn query(&self, name: QueryName) -> Result<&QueryTemplate> {
        self.queries
            .get(name.as_str())
            .ok_or_else(|| SqlToolsError::MissingQuery {
                kind: self.kind.clone(),
                query: name.to_string(),
            })
    }

    /// Argument list for a CLI run.
    ///
    /// Options are only inserted for a named query that defines some;
    /// arbitrary execution (`None`) never gets any.
    pub fn build_args(&self, query: Option<QueryName>) -> Result<Vec<String>> {
        let options: &[String] = match query {
            Some(name) => &self.query(name)?.options,
            None => &[],
        };
        template::build_args(
            &self.cli_path,
            options,
            &self.args_template,
            &self.template_fields(),
        )
    }
}

/// Text form of a scalar TOML value; arrays and tables have none.
fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
