use serde_json::Value;

use crate::{
    truncate_chars, ConfirmAnswer, Effect, InboundEvent, LogLevel, MessageKind, Msg,
    OutboundEvent, PipelineDone, SessionState, CHAT_WORKFLOW,
};

const CONNECTED_TEXT: &str = "Connected to backend";
const DISCONNECTED_TEXT: &str = "Disconnected from backend";
const UNKNOWN_ERROR_TEXT: &str = "Unknown error";
const UNKNOWN_TOOL: &str = "unknown";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::Inbound(event) => {
            apply_inbound(&mut state, event);
            Vec::new()
        }
        Msg::SendInput(text) => {
            if !state.is_connected() || text.trim().is_empty() {
                return (state, Vec::new());
            }
            state.push_message(MessageKind::User, text.clone(), None);
            vec![Effect::Emit(OutboundEvent::Input { text })]
        }
        Msg::ConfirmResponse { request, accepted } => {
            if !state.is_connected() {
                return (state, Vec::new());
            }
            // Cleared before the backend acknowledges; a lost response is not retried.
            state.set_pending_confirmation(None);
            vec![Effect::Emit(OutboundEvent::ConfirmResponse {
                answer: ConfirmAnswer::from(accepted),
                kind: request.kind,
                tool: request.tool,
            })]
        }
        Msg::SendCommand { name, fields } => {
            if !state.is_connected() {
                return (state, Vec::new());
            }
            vec![Effect::Emit(OutboundEvent::Command { name, fields })]
        }
        Msg::ClearMessages => {
            state.clear_messages();
            Vec::new()
        }
        Msg::ClearLog => {
            state.clear_log();
            Vec::new()
        }
    };

    (state, effects)
}

fn apply_inbound(state: &mut SessionState, event: InboundEvent) {
    match event {
        InboundEvent::Connected => {
            state.set_connected(true);
            state.push_message(MessageKind::System, CONNECTED_TEXT, None);
        }
        InboundEvent::Disconnected => {
            state.set_connected(false);
            state.push_message(MessageKind::System, DISCONNECTED_TEXT, None);
        }
        InboundEvent::Message {
            text,
            kind,
            payload,
        } => {
            if let Some(payload) = payload.as_ref() {
                apply_message_payload(state, payload);
            }
            state.push_message(kind, text, payload);
        }
        InboundEvent::Log { level, message } => state.push_log(level, message),
        InboundEvent::ToolCall { tool, args } => {
            let preview = preview_value(&args, state.limits().preview_chars);
            let line = if preview.is_empty() {
                format!("→ {}", tool_label(&tool))
            } else {
                format!("→ {} {}", tool_label(&tool), preview)
            };
            state.push_log(LogLevel::Tool, line);
        }
        InboundEvent::ToolResult { tool, result } => {
            let preview = preview_value(&result, state.limits().preview_chars);
            state.push_log(
                LogLevel::Tool,
                format!("← {}: {}", tool_label(&tool), preview),
            );
        }
        InboundEvent::Status(snapshot) => state.set_status(Some(snapshot)),
        InboundEvent::Confirm(request) => state.set_pending_confirmation(Some(request)),
        InboundEvent::Done(record) => {
            state.set_pipeline_done(Some(PipelineDone::from_record(record)));
            state.set_status(None);
        }
        InboundEvent::Error { message } => {
            let text = message.unwrap_or_else(|| UNKNOWN_ERROR_TEXT.to_string());
            state.push_message(MessageKind::Error, text, None);
        }
    }
}

/// Workflow, project and terminal status ride along on message payloads.
/// Chat mode only updates the workflow tag; only a terminal status ends the run.
fn apply_message_payload(state: &mut SessionState, payload: &Value) {
    let Some(workflow) = payload.get("workflow").and_then(Value::as_str) else {
        return;
    };
    state.set_active_workflow(Some(workflow.to_string()));
    if workflow == CHAT_WORKFLOW {
        return;
    }
    if let Some(project) = payload.get("project").and_then(Value::as_str) {
        state.set_active_project(Some(project.to_string()));
    }
    let status = payload.get("status").and_then(Value::as_str);
    if status.is_some_and(PipelineDone::is_terminal_status) {
        state.set_pipeline_done(Some(PipelineDone::from_record(payload.clone())));
    }
}

fn tool_label(tool: &str) -> &str {
    if tool.is_empty() {
        UNKNOWN_TOOL
    } else {
        tool
    }
}

/// Strings are shown verbatim, everything else as compact JSON.
fn preview_value(value: &Value, max_chars: usize) -> String {
    let rendered = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate_chars(&rendered, max_chars).to_string()
}
