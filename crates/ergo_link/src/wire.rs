//! Engine.IO v4 / Socket.IO v5 text framing over a websocket.
//!
//! Only the websocket transport is spoken, so there is no payload batching:
//! each websocket text frame carries exactly one Engine.IO packet. Socket.IO
//! packets ride inside Engine.IO `message` packets (`4`).

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Engine.IO protocol revision sent in the `EIO` query parameter.
pub const ENGINE_IO_VERSION: &str = "4";

#[derive(Debug, Error)]
pub enum WireError {
    #[error("empty frame")]
    Empty,
    #[error("unknown engine.io packet type `{0}`")]
    UnknownEnginePacket(char),
    #[error("unknown socket.io packet type `{0}`")]
    UnknownSocketPacket(char),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event packet without a name")]
    MissingEventName,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Handshake {
    pub sid: String,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    pub max_payload: u64,
}

impl Handshake {
    /// Longest the server may stay silent before the socket counts as lost.
    /// `None` when the handshake announced no ping schedule.
    pub fn silence_limit(&self) -> Option<Duration> {
        let total = self.ping_interval.saturating_add(self.ping_timeout);
        (total > 0).then(|| Duration::from_millis(total))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, data: Value },
    Ack,
    ConnectError(Value),
}

pub fn decode_frame(frame: &str) -> Result<EnginePacket, WireError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(WireError::Empty)?;
    let body = chars.as_str();
    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(body)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => Ok(EnginePacket::Message(decode_socket_packet(body)?)),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(WireError::UnknownEnginePacket(other)),
    }
}

fn decode_socket_packet(packet: &str) -> Result<SocketPacket, WireError> {
    let mut chars = packet.chars();
    let kind = chars.next().ok_or(WireError::Empty)?;
    let body = skip_ack_id(skip_namespace(chars.as_str()));
    match kind {
        '0' => {
            let data = if body.is_empty() {
                None
            } else {
                Some(serde_json::from_str(body)?)
            };
            Ok(SocketPacket::Connect(data))
        }
        '1' => Ok(SocketPacket::Disconnect),
        '2' => decode_event(body),
        '3' => Ok(SocketPacket::Ack),
        '4' => Ok(SocketPacket::ConnectError(if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body)?
        })),
        // Binary events are never produced by the backend's JSON payloads.
        other => Err(WireError::UnknownSocketPacket(other)),
    }
}

/// `["name", data, ...]`; only the first argument is kept.
fn decode_event(body: &str) -> Result<SocketPacket, WireError> {
    let args: Vec<Value> = serde_json::from_str(body)?;
    let mut args = args.into_iter();
    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => return Err(WireError::MissingEventName),
    };
    let data = args.next().unwrap_or(Value::Null);
    Ok(SocketPacket::Event { name, data })
}

fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn skip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// Opens the default namespace.
pub fn encode_connect() -> String {
    "40".to_string()
}

pub fn encode_disconnect() -> String {
    "41".to_string()
}

pub fn encode_pong(probe: &str) -> String {
    format!("3{probe}")
}

pub fn encode_event(name: &str, data: &Value) -> String {
    let args = Value::Array(vec![Value::from(name), data.clone()]);
    format!("42{args}")
}
