use std::fs;

use clap::Parser;
use ergo_app::config::{load_config, resolve_config, save_config, Cli, ConfigError, ConsoleConfig};
use ergo_logging::LogDestination;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn missing_file_means_defaults() {
    let temp = TempDir::new().unwrap();
    let loaded = load_config(&temp.path().join("absent.ron")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("console.ron");
    fs::write(&path, r#"(server_url: "http://backend:9000", show_log: true)"#).unwrap();

    let config = load_config(&path).unwrap().expect("config present");

    assert_eq!(config.server_url, "http://backend:9000");
    assert!(config.show_log);
    assert_eq!(config.log_capacity, 500);
    assert_eq!(config.preview_chars, 120);
    assert_eq!(config.socket_path, "/socket.io/");
}

#[test]
fn invalid_file_is_reported_and_defaults_used() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("console.ron");
    fs::write(&path, "(server_url: ").unwrap();

    let cli = Cli::parse_from(["ergo", "--config", path.to_str().unwrap()]);
    let (config, error) = resolve_config(&cli);

    assert!(matches!(error, Some(ConfigError::Parse { .. })));
    assert_eq!(config, ConsoleConfig::default());
}

#[test]
fn cli_overrides_file_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("console.ron");
    fs::write(&path, r#"(server_url: "http://file:1", log_capacity: 50)"#).unwrap();

    let cli = Cli::parse_from([
        "ergo",
        "--config",
        path.to_str().unwrap(),
        "--server",
        "http://cli:2",
        "--preview-chars",
        "40",
        "--log-to",
        "off",
    ]);
    let (config, error) = resolve_config(&cli);

    assert!(error.is_none());
    assert_eq!(config.server_url, "http://cli:2");
    assert_eq!(config.log_capacity, 50);
    assert_eq!(config.store_limits().preview_chars, 40);
    assert_eq!(config.log_destination(), LogDestination::Off);
}

#[test]
fn saved_config_round_trips() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("console.ron");
    let config = ConsoleConfig {
        server_url: "https://agents.example.com".into(),
        reconnect_delay_ms: 750,
        ..ConsoleConfig::default()
    };

    save_config(&path, &config).unwrap();
    save_config(&path, &config).unwrap();

    assert_eq!(load_config(&path).unwrap(), Some(config.clone()));
    let settings = config.link_settings();
    assert_eq!(settings.reconnect_delay.as_millis(), 750);
}
