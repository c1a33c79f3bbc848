use serde_json::{Map, Value};

use crate::events;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(OutboundEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    No,
}

impl ConfirmAnswer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl From<bool> for ConfirmAnswer {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Events the console sends to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    Input {
        text: String,
    },
    ConfirmResponse {
        answer: ConfirmAnswer,
        kind: String,
        tool: Option<String>,
    },
    Command {
        name: String,
        fields: Map<String, Value>,
    },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => events::INPUT,
            Self::ConfirmResponse { .. } => events::CONFIRM_RESPONSE,
            Self::Command { .. } => events::COMMAND,
        }
    }

    /// JSON body sent alongside the event name.
    pub fn payload(&self) -> Value {
        match self {
            Self::Input { text } => serde_json::json!({ "text": text }),
            Self::ConfirmResponse { answer, kind, tool } => {
                let mut body = Map::new();
                body.insert("response".into(), Value::from(answer.as_str()));
                body.insert("type".into(), Value::from(kind.as_str()));
                if let Some(tool) = tool {
                    body.insert("tool".into(), Value::from(tool.as_str()));
                }
                Value::Object(body)
            }
            Self::Command { name, fields } => {
                let mut body = fields.clone();
                // The command identifier wins over a caller-supplied `command` key.
                body.insert("command".into(), Value::from(name.as_str()));
                Value::Object(body)
            }
        }
    }
}
