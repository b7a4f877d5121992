use std::sync::Arc;

use tempfile::TempDir;

use clap::Parser;
use sqltools::cli::{CliArgs, CliCommand, LogLevel};
use sqltools::config::default_config_path;
use sqltools::config::{ConfigFile, FormatSettings};
use sqltools::errors::SqlToolsError;
use sqltools::format::format_sql;
use sqltools::history::HistoryBuffer;
use sqltools::logging::resolve_level;
use sqltools::session::Session;
use sqltools::shell::ShellCommand;
use sqltools::storage::SavedQueries;
use sqltools::types::KeywordCase;
use sqltools_test_utils::builders::{connection_config, ConfigFileBuilder, KindConfigBuilder};
use sqltools_test_utils::recording::RecordingNotifier;

fn two_connections() -> ConfigFileBuilder {
    ConfigFileBuilder::new()
        .with_cli("pgsql", "psql")
        .with_kind("pgsql", KindConfigBuilder::new("-h {host}").build())
        .with_connection("local", connection_config("pgsql"))
        .with_connection("staging", connection_config("pgsql"))
}

fn session(cfg: ConfigFile) -> Session {
    Session::new(cfg, "SQLTools.toml", Arc::new(RecordingNotifier::new())).unwrap()
}

#[test]
fn explicit_connection_wins_over_default() {
    let s = session(two_connections().with_default_connection("local").build());
    assert_eq!(s.connection(Some("staging")).unwrap().name, "staging");
    assert_eq!(s.connection(None).unwrap().name, "local");
}

#[test]
fn single_connection_is_picked_implicitly() {
    let cfg = ConfigFileBuilder::new()
        .with_cli("pgsql", "psql")
        .with_kind("pgsql", KindConfigBuilder::new("").build())
        .with_connection("only", connection_config("pgsql"))
        .build();
    assert_eq!(session(cfg).connection(None).unwrap().name, "only");
}

#[test]
fn ambiguous_or_unknown_connection_is_an_error() {
    let s = session(two_connections().build());
    assert!(matches!(s.connection(None), Err(SqlToolsError::ConfigError(_))));
    assert!(matches!(
        s.connection(Some("prod")),
        Err(SqlToolsError::UnknownConnection(name)) if name == "prod"
    ));
}

#[test]
fn session_history_uses_configured_capacity() {
    let s = session(two_connections().with_history_size(2).build());
    assert_eq!(s.history().capacity(), 2);
}

#[test]
fn history_evicts_oldest_first() {
    let history = HistoryBuffer::new(2);
    history.push("q1");
    history.push("q2");
    history.push("q3");
    assert_eq!(history.entries(), vec!["q2".to_string(), "q3".to_string()]);
    assert_eq!(history.get(0).unwrap(), "q2");
    assert!(matches!(
        history.get(5),
        Err(SqlToolsError::HistoryIndex { index: 5, len: 2 })
    ));
}

#[test]
fn history_capacity_zero_keeps_one_entry() {
    let history = HistoryBuffer::new(0);
    history.push("a");
    history.push("b");
    assert_eq!(history.entries(), vec!["b".to_string()]);
}

#[test]
fn concurrent_pushes_are_never_lost() {
    let history = HistoryBuffer::new(1000);
    let threads: Vec<_> = (0..8)
        .map(|t| {
            let history = history.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    history.push(format!("select {t}, {i}"));
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }
    assert_eq!(history.len(), 400);
}

#[test]
fn saved_queries_round_trip_through_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/saved.toml");

    let mut saved = SavedQueries::load(&path).unwrap();
    assert!(saved.is_empty());
    assert!(saved.save("active users", "select * from users where active").unwrap());
    assert!(!saved.save("", "ignored").unwrap());

    let reloaded = SavedQueries::load(&path).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(
        reloaded.get("active users").unwrap(),
        "select * from users where active"
    );
    assert!(matches!(
        reloaded.get("nope"),
        Err(SqlToolsError::SavedQueryNotFound(_))
    ));
}

#[test]
fn formatter_follows_keyword_case() {
    let raw = "select id, name from users where id = 1";

    let upper = format_sql(raw, &FormatSettings::default());
    assert!(upper.contains("SELECT"));
    assert!(upper.contains("FROM"));

    let lower = format_sql(
        "SELECT id FROM users",
        &FormatSettings {
            keyword_case: KeywordCase::Lower,
            ..FormatSettings::default()
        },
    );
    assert!(lower.contains("select"));
    assert!(!lower.contains("SELECT"));
}

#[test]
fn formatter_can_add_trailing_newline() {
    let settings = FormatSettings {
        ensure_newline_at_eof: true,
        ..FormatSettings::default()
    };
    assert!(format_sql("select 1", &settings).ends_with('\n'));
}

#[test]
fn shell_lines_parse_into_commands() {
    assert_eq!(ShellCommand::parse("   "), Ok(ShellCommand::Empty));
    assert_eq!(ShellCommand::parse(":q"), Ok(ShellCommand::Quit));
    assert_eq!(ShellCommand::parse(":tables"), Ok(ShellCommand::Tables));
    assert_eq!(
        ShellCommand::parse(":desc users"),
        Ok(ShellCommand::Describe("users".to_string()))
    );
    assert_eq!(ShellCommand::parse(":run 3"), Ok(ShellCommand::Rerun(3)));
    assert_eq!(
        ShellCommand::parse("select 1;"),
        Ok(ShellCommand::Sql("select 1;".to_string()))
    );
    assert!(ShellCommand::parse(":records").is_err());
    assert!(ShellCommand::parse(":run x").is_err());
    assert!(ShellCommand::parse(":drop").is_err());
}

#[test]
fn log_level_priority() {
    use tracing::Level;

    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace"), true), Level::WARN);
    assert_eq!(resolve_level(None, Some("trace"), true), Level::TRACE);
    assert_eq!(resolve_level(None, Some("garbage"), true), Level::DEBUG);
    assert_eq!(resolve_level(None, None, false), Level::INFO);
}

#[test]
fn config_flag_defaults_to_the_working_directory_file() {
    let args = CliArgs::try_parse_from(["sqltools", "connections"]).unwrap();
    assert_eq!(args.config, default_config_path());
    assert!(matches!(args.command, CliCommand::Connections));

    let args =
        CliArgs::try_parse_from(["sqltools", "tables", "--config", "conf/db.toml", "-c", "local"])
            .unwrap();
    assert_eq!(args.config, std::path::PathBuf::from("conf/db.toml"));
    assert_eq!(args.connection.as_deref(), Some("local"));
}

#[test]
fn keyword_case_accepts_none_as_preserve() {
    let settings: FormatSettings = toml::from_str("keyword_case = \"none\"").unwrap();
    assert_eq!(settings.keyword_case, KeywordCase::Preserve);
}
