// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Note that the *result* of an external command never travels through this
//! type: SQL errors and watchdog kills are delivered as
//! [`crate::exec::CommandOutcome`]. These errors cover everything that can go
//! wrong before a command is started (config, templates, lookups).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlToolsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Connection not found: {0}")]
    UnknownConnection(String),

    #[error("No '{query}' query configured for database type '{kind}'")]
    MissingQuery { kind: String, query: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("No query at history index {index} (history holds {len})")]
    HistoryIndex { index: usize, len: usize },

    #[error("Saved query not found: {0}")]
    SavedQueryNotFound(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SqlToolsError>;
