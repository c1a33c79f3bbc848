//! Console configuration: an optional RON file overridden by command line flags.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use ergo_core::{StoreLimits, DEFAULT_LOG_CAPACITY, DEFAULT_PREVIEW_CHARS};
use ergo_link::LinkSettings;
use ergo_logging::LogDestination;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "ergo_console.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server_url: String,
    pub socket_path: String,
    pub connect_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
    pub log_capacity: usize,
    pub preview_chars: usize,
    /// Print the backend's log and tool trace alongside chat messages.
    pub show_log: bool,
    /// `file`, `terminal`, `both` or `off`.
    pub log_to: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let link = LinkSettings::default();
        Self {
            server_url: link.server_url,
            socket_path: link.socket_path,
            connect_timeout_ms: link.connect_timeout.as_millis() as u64,
            reconnect_delay_ms: link.reconnect_delay.as_millis() as u64,
            log_capacity: DEFAULT_LOG_CAPACITY,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            show_log: false,
            log_to: "file".to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            server_url: self.server_url.clone(),
            socket_path: self.socket_path.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }

    pub fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            log_capacity: self.log_capacity,
            preview_chars: self.preview_chars,
        }
    }

    /// Unknown values fall back to the log file.
    pub fn log_destination(&self) -> LogDestination {
        LogDestination::parse(&self.log_to)
            .unwrap_or_else(|| LogDestination::File(ergo_logging::DEFAULT_LOG_FILE.into()))
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ergo", about = "Terminal console for the Ergodeon agent backend")]
pub struct Cli {
    /// Configuration file (RON).
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Backend base URL, e.g. http://127.0.0.1:8000.
    #[arg(long)]
    pub server: Option<String>,
    #[arg(long)]
    pub socket_path: Option<String>,
    #[arg(long)]
    pub log_capacity: Option<usize>,
    #[arg(long)]
    pub preview_chars: Option<usize>,
    #[arg(long)]
    pub reconnect_ms: Option<u64>,
    /// Where console diagnostics go: file, terminal, both or off.
    #[arg(long)]
    pub log_to: Option<String>,
    /// Show backend log and tool trace lines.
    #[arg(long)]
    pub show_log: bool,
    /// Query the backend health endpoint and exit.
    #[arg(long)]
    pub check: bool,
    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut ConsoleConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(path) = &self.socket_path {
            config.socket_path = path.clone();
        }
        if let Some(capacity) = self.log_capacity {
            config.log_capacity = capacity;
        }
        if let Some(chars) = self.preview_chars {
            config.preview_chars = chars;
        }
        if let Some(ms) = self.reconnect_ms {
            config.reconnect_delay_ms = ms;
        }
        if let Some(log_to) = &self.log_to {
            config.log_to = log_to.clone();
        }
        if self.show_log {
            config.show_log = true;
        }
    }
}

/// Reads a configuration file; a missing file is `Ok(None)`.
pub fn load_config(path: &Path) -> Result<Option<ConsoleConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Atomically replaces `path` with the pretty-printed configuration.
pub fn save_config(path: &Path, config: &ConsoleConfig) -> Result<(), ConfigError> {
    let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())?;
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// File values with command line overrides on top. A file that cannot be
/// used is reported alongside the defaults so the caller can log it once
/// logging is up.
pub fn resolve_config(cli: &Cli) -> (ConsoleConfig, Option<ConfigError>) {
    let (mut config, error) = match load_config(&cli.config) {
        Ok(loaded) => (loaded.unwrap_or_default(), None),
        Err(err) => (ConsoleConfig::default(), Some(err)),
    };
    cli.apply(&mut config);
    (config, error)
}
