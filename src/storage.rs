// src/storage.rs

//! Saved queries: alias → query text, persisted as a flat TOML table.
//!
//! ```toml
//! "active users" = "select * from users where active"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SqlToolsError};

#[derive(Debug, Clone)]
pub struct SavedQueries {
    path: PathBuf,
    queries: BTreeMap<String, String>,
}

impl SavedQueries {
    /// Load saved queries from `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let queries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            debug!(path = %path.display(), "no saved queries file yet");
            BTreeMap::new()
        };

        Ok(Self { path, queries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, alias: &str) -> Result<&str> {
        self.queries
            .get(alias)
            .map(String::as_str)
            .ok_or_else(|| SqlToolsError::SavedQueryNotFound(alias.to_string()))
    }

    /// Store `query` under `alias` and write the file.
    ///
    /// An empty alias is ignored; returns whether anything was saved.
    pub fn save(&mut self, alias: &str, query: impl Into<String>) -> Result<bool> {
        if alias.is_empty() {
            return Ok(false);
        }
        self.queries.insert(alias.to_string(), query.into());
        self.flush()?;
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.queries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string(&self.queries)?;
        fs::write(&self.path, contents)?;
        debug!(path = %self.path.display(), count = self.queries.len(), "saved queries written");
        Ok(())
    }
}
