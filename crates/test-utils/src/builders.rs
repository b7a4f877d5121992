#![allow(dead_code)]

use std::collections::BTreeMap;

use sqltools::config::{
    ConfigFile, ConnectionConfig, KindConfig, QueryTemplate, RawConfigFile, Settings,
};
use sqltools::connection::ConnectionDescriptor;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                settings: Settings::default(),
                cli: BTreeMap::new(),
                kinds: BTreeMap::new(),
                connections: BTreeMap::new(),
            },
        }
    }

    pub fn with_cli(mut self, kind: &str, path: &str) -> Self {
        self.config.cli.insert(kind.to_string(), path.to_string());
        self
    }

    pub fn with_kind(mut self, kind: &str, cfg: KindConfig) -> Self {
        self.config.kinds.insert(kind.to_string(), cfg);
        self
    }

    pub fn with_connection(mut self, name: &str, conn: ConnectionConfig) -> Self {
        self.config.connections.insert(name.to_string(), conn);
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.config.settings.thread_timeout = ms;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.config.settings.history_size = size;
        self
    }

    pub fn with_default_connection(mut self, name: &str) -> Self {
        self.config.settings.default_connection = Some(name.to_string());
        self
    }

    pub fn with_unescape_extension(mut self, ext: &str) -> Self {
        self.config.settings.unescape_quotes.push(ext.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `[connections.<name>]` entry with only a type set.
pub fn connection_config(kind: &str) -> ConnectionConfig {
    ConnectionConfig {
        kind: kind.to_string(),
        host: "localhost".to_string(),
        port: Some(5432),
        username: "postgres".to_string(),
        database: "postgres".to_string(),
        password: None,
        service: None,
        extra: BTreeMap::new(),
    }
}

/// Builder for `KindConfig`.
pub struct KindConfigBuilder {
    kind: KindConfig,
}

impl KindConfigBuilder {
    pub fn new(args: &str) -> Self {
        Self {
            kind: KindConfig {
                args: args.to_string(),
                before: vec![],
                queries: BTreeMap::new(),
            },
        }
    }

    pub fn before(mut self, query: &str) -> Self {
        self.kind.before.push(query.to_string());
        self
    }

    pub fn query(mut self, name: &str, query: &str, options: &[&str]) -> Self {
        self.kind.queries.insert(
            name.to_string(),
            QueryTemplate {
                query: query.to_string(),
                options: options.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn build(self) -> KindConfig {
        self.kind
    }
}

/// Builder for a `ConnectionDescriptor` without going through config.
pub struct DescriptorBuilder {
    desc: ConnectionDescriptor,
}

impl DescriptorBuilder {
    pub fn new(cli_path: &str) -> Self {
        Self {
            desc: ConnectionDescriptor {
                name: "test".to_string(),
                kind: "test".to_string(),
                host: "localhost".to_string(),
                port: Some(5432),
                username: "postgres".to_string(),
                database: "postgres".to_string(),
                password: None,
                service: None,
                extra: BTreeMap::new(),
                cli_path: cli_path.to_string(),
                args_template: String::new(),
                before: vec![],
                queries: BTreeMap::new(),
                rows_limit: 50,
            },
        }
    }

    pub fn args(mut self, template: &str) -> Self {
        self.desc.args_template = template.to_string();
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.desc.host = host.to_string();
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.desc.username = username.to_string();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.desc.password = Some(password.to_string());
        self
    }

    pub fn extra(mut self, key: &str, value: &str) -> Self {
        self.desc.extra.insert(key.to_string(), value.to_string());
        self
    }

    pub fn rows_limit(mut self, limit: u64) -> Self {
        self.desc.rows_limit = limit;
        self
    }

    pub fn before(mut self, query: &str) -> Self {
        self.desc.before.push(query.to_string());
        self
    }

    pub fn query(mut self, name: &str, query: &str, options: &[&str]) -> Self {
        self.desc.queries.insert(
            name.to_string(),
            QueryTemplate {
                query: query.to_string(),
                options: options.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn build(self) -> ConnectionDescriptor {
        self.desc
    }
}

/// A descriptor whose CLI is `sh -c <script>`: the script sees the query
/// file on stdin. The script must not contain braces, which the args
/// template treats as placeholders.
pub fn shell_descriptor(script: &str) -> DescriptorBuilder {
    let quoted = shell_quote(script);
    DescriptorBuilder::new("sh").args(&format!("-c {quoted}"))
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
