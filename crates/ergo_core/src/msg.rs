use serde_json::{Map, Value};

use crate::{ConfirmRequest, InboundEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Decoded event from the backend channel.
    Inbound(InboundEvent),
    /// User submitted chat text.
    SendInput(String),
    /// User answered a confirmation request.
    ConfirmResponse {
        request: ConfirmRequest,
        accepted: bool,
    },
    /// User issued a structured command.
    SendCommand {
        name: String,
        fields: Map<String, Value>,
    },
    /// User cleared the chat transcript.
    ClearMessages,
    /// User cleared the tool/log trace.
    ClearLog,
}
