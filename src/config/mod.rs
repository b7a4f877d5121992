// src/config/mod.rs

//! Configuration loading and validation for sqltools.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate cross-references between connections, CLIs and database types
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_relative};
pub use model::{
    ConfigFile, ConnectionConfig, FormatSettings, KindConfig, QueryTemplate, RawConfigFile,
    Settings, ShowRecordsSettings,
};
