// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SqlToolsError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SqlToolsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_connections(cfg)?;
    validate_settings(cfg)?;
    validate_connection_kinds(cfg)?;
    validate_default_connection(cfg)?;
    Ok(())
}

fn ensure_has_connections(cfg: &RawConfigFile) -> Result<()> {
    if cfg.connections.is_empty() {
        return Err(SqlToolsError::ConfigError(
            "config must contain at least one [connections.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(cfg: &RawConfigFile) -> Result<()> {
    if cfg.settings.thread_timeout == 0 {
        return Err(SqlToolsError::ConfigError(
            "[settings].thread_timeout must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.settings.history_size == 0 {
        return Err(SqlToolsError::ConfigError(
            "[settings].history_size must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_connection_kinds(cfg: &RawConfigFile) -> Result<()> {
    for (name, conn) in cfg.connections.iter() {
        match cfg.cli.get(&conn.kind) {
            None => {
                return Err(SqlToolsError::ConfigError(format!(
                    "connection '{}' has type '{}' but [cli] has no '{}' entry",
                    name, conn.kind, conn.kind
                )));
            }
            Some(path) if path.trim().is_empty() => {
                return Err(SqlToolsError::ConfigError(format!(
                    "[cli].{} must not be empty (used by connection '{}')",
                    conn.kind, name
                )));
            }
            Some(_) => {}
        }

        if !cfg.kinds.contains_key(&conn.kind) {
            return Err(SqlToolsError::ConfigError(format!(
                "connection '{}' has type '{}' but there is no [kinds.{}] section",
                name, conn.kind, conn.kind
            )));
        }
    }
    Ok(())
}

fn validate_default_connection(cfg: &RawConfigFile) -> Result<()> {
    if let Some(ref default) = cfg.settings.default_connection {
        if !cfg.connections.contains_key(default) {
            return Err(SqlToolsError::ConfigError(format!(
                "[settings].default_connection '{}' is not a known connection",
                default
            )));
        }
    }
    Ok(())
}
