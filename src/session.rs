// src/session.rs

//! One user session: validated config, connection descriptors, the
//! scheduler and the history buffer it appends to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::loader::resolve_relative;
use crate::config::model::ConfigFile;
use crate::connection::ConnectionDescriptor;
use crate::engine::{ExecutionScheduler, SchedulerOptions};
use crate::errors::{Result, SqlToolsError};
use crate::exec::Notifier;
use crate::format::format_sql;
use crate::history::HistoryBuffer;
use crate::storage::SavedQueries;

#[derive(Debug)]
pub struct Session {
    config: ConfigFile,
    config_path: PathBuf,
    connections: BTreeMap<String, ConnectionDescriptor>,
    scheduler: ExecutionScheduler,
}

impl Session {
    pub fn new(
        config: ConfigFile,
        config_path: impl Into<PathBuf>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let connections = ConnectionDescriptor::all_from_config(&config)?;
        let history = HistoryBuffer::new(config.settings.history_size);
        let options = SchedulerOptions::from_settings(&config.settings);
        let scheduler = ExecutionScheduler::new(options, history, notifier);

        Ok(Self {
            config,
            config_path: config_path.into(),
            connections,
            scheduler,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn scheduler(&self) -> &ExecutionScheduler {
        &self.scheduler
    }

    pub fn history(&self) -> &HistoryBuffer {
        self.scheduler.history()
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionDescriptor> {
        self.connections.values()
    }

    /// Resolve the connection to use.
    ///
    /// Order: the explicit name, then `[settings].default_connection`, then
    /// the only configured connection if there is exactly one.
    pub fn connection(&self, name: Option<&str>) -> Result<&ConnectionDescriptor> {
        let name = match name.or(self.config.settings.default_connection.as_deref()) {
            Some(name) => name,
            None if self.connections.len() == 1 => {
                return self
                    .connections
                    .values()
                    .next()
                    .ok_or_else(|| SqlToolsError::ConfigError("no connections".to_string()));
            }
            None => {
                return Err(SqlToolsError::ConfigError(
                    "no connection selected: pass --connection or set [settings].default_connection"
                        .to_string(),
                ));
            }
        };

        self.connections
            .get(name)
            .ok_or_else(|| SqlToolsError::UnknownConnection(name.to_string()))
    }

    pub fn saved_queries_path(&self) -> PathBuf {
        resolve_relative(&self.config_path, &self.config.settings.saved_queries)
    }

    pub fn saved_queries(&self) -> Result<SavedQueries> {
        SavedQueries::load(self.saved_queries_path())
    }

    pub fn format(&self, raw: &str) -> String {
        format_sql(raw, &self.config.settings.format)
    }
}
