use serde_json::Value;

use crate::{events, ConfirmRequest, LogLevel, MessageKind, StatusSnapshot};

/// Backend event after field defaults have been applied.
///
/// Decoding never fails on a known event name: absent or mistyped fields
/// fall back to empty, zero or `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Connected,
    Disconnected,
    Message {
        text: String,
        kind: MessageKind,
        payload: Option<Value>,
    },
    Log {
        level: LogLevel,
        message: String,
    },
    ToolCall {
        tool: String,
        args: Value,
    },
    ToolResult {
        tool: String,
        result: Value,
    },
    Status(StatusSnapshot),
    Confirm(ConfirmRequest),
    Done(Value),
    Error {
        message: Option<String>,
    },
}

impl InboundEvent {
    /// Maps a wire event to its typed form; `None` for unknown names.
    pub fn decode(name: &str, data: &Value) -> Option<Self> {
        let event = match name {
            events::CONNECT => Self::Connected,
            events::DISCONNECT => Self::Disconnected,
            events::MESSAGE => Self::Message {
                text: body_text(data, &["text"]).unwrap_or_default(),
                kind: text_field(data, &["type"])
                    .and_then(|raw| MessageKind::parse(&raw))
                    .unwrap_or(MessageKind::Assistant),
                payload: data.get("payload").filter(|p| !p.is_null()).cloned(),
            },
            events::LOG => Self::Log {
                level: text_field(data, &["level"])
                    .and_then(|raw| LogLevel::parse(&raw))
                    .unwrap_or(LogLevel::Info),
                message: body_text(data, &["message", "msg"]).unwrap_or_default(),
            },
            events::TOOL_CALL => Self::ToolCall {
                tool: text_field(data, &["tool"]).unwrap_or_default(),
                args: data.get("args").cloned().unwrap_or(Value::Null),
            },
            events::TOOL_RESULT => Self::ToolResult {
                tool: text_field(data, &["tool"]).unwrap_or_default(),
                result: data.get("result").cloned().unwrap_or(Value::Null),
            },
            events::STATUS => Self::Status(StatusSnapshot {
                phase: text_field(data, &["phase"]),
                step: int_field(data, "step"),
                total: int_field(data, "total"),
                description: text_field(data, &["description"]),
                status: text_field(data, &["status"]),
            }),
            events::CONFIRM => Self::Confirm(ConfirmRequest {
                kind: text_field(data, &["type"]).unwrap_or_default(),
                message: text_field(data, &["message"]).unwrap_or_default(),
                tool: text_field(data, &["tool"]),
                args: data.get("args").filter(|a| !a.is_null()).cloned(),
            }),
            events::DONE => Self::Done(data.clone()),
            events::ERROR => Self::Error {
                message: body_text(data, &["error", "msg", "message"])
                    .filter(|m| !m.is_empty()),
            },
            _ => return None,
        };
        Some(event)
    }
}

/// Like [`text_field`], but a bare string payload is the body itself.
fn body_text(data: &Value, keys: &[&str]) -> Option<String> {
    match data {
        Value::String(raw) => Some(raw.clone()),
        _ => text_field(data, keys),
    }
}

/// First present field among `keys`, rendered as text.
fn text_field(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find_map(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

fn int_field(data: &Value, key: &str) -> i64 {
    match data.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_string_payload_is_used_as_text() {
        let event = InboundEvent::decode(events::LOG, &json!("plain line")).unwrap();
        assert_eq!(
            event,
            InboundEvent::Log {
                level: LogLevel::Info,
                message: "plain line".into()
            }
        );
    }

    #[test]
    fn numeric_fields_accept_strings() {
        let event =
            InboundEvent::decode(events::STATUS, &json!({"step": "3", "total": 7.0})).unwrap();
        let InboundEvent::Status(snapshot) = event else {
            panic!("expected status");
        };
        assert_eq!(snapshot.step, 3);
        assert_eq!(snapshot.total, 7);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(InboundEvent::decode("heartbeat", &Value::Null).is_none());
    }
}
