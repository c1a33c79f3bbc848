use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::wire::WireError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Backend base URL; `http`/`https` are mapped to `ws`/`wss`.
    pub server_url: String,
    /// Well-known path the backend serves the event channel on.
    pub socket_path: String,
    pub connect_timeout: Duration,
    /// Pause between a lost connection and the next dial.
    pub reconnect_delay: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            socket_path: "/socket.io/".to_string(),
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

/// What the transport reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Connected,
    Disconnected { reason: String },
    Event { name: String, data: Value },
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("protocol error: {0}")]
    Wire(#[from] WireError),
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    HttpStatus(u16),
    #[error("invalid health response: {0}")]
    InvalidHealth(#[from] serde_json::Error),
    #[error("failed to start link runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
