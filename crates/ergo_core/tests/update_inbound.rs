use std::sync::Once;

use ergo_core::{
    events, update, InboundEvent, LogLevel, MessageKind, Msg, SessionState, StatusSnapshot,
    StoreCell,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ergo_logging::initialize_for_tests);
}

fn deliver(state: SessionState, name: &str, data: Value) -> SessionState {
    let event = InboundEvent::decode(name, &data).expect("known event");
    let (state, effects) = update(state, Msg::Inbound(event));
    assert!(effects.is_empty(), "inbound events never emit");
    state
}

fn connected() -> SessionState {
    deliver(SessionState::new(), events::CONNECT, Value::Null)
}

#[test]
fn connect_sets_flag_and_announces() {
    init_logging();
    let state = connected();

    assert!(state.is_connected());
    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.messages()[0].kind, MessageKind::System);
}

#[test]
fn disconnect_always_clears_active_workflow() {
    init_logging();
    let state = deliver(
        connected(),
        events::MESSAGE,
        json!({"text": "ok", "type": "result", "payload": {"workflow": "build", "project": "projects/x"}}),
    );
    assert_eq!(state.active_workflow(), Some("build"));

    let state = deliver(state, events::DISCONNECT, Value::Null);

    assert!(!state.is_connected());
    assert_eq!(state.active_workflow(), None);
    assert_eq!(state.active_project(), Some("projects/x"));
    assert_eq!(state.messages().last().unwrap().kind, MessageKind::System);
}

#[test]
fn chat_workflow_never_resets_project() {
    init_logging();
    let state = deliver(
        connected(),
        events::MESSAGE,
        json!({"text": "built", "payload": {"workflow": "build", "project": "projects/x"}}),
    );
    assert_eq!(state.active_workflow(), Some("build"));
    assert_eq!(state.active_project(), Some("projects/x"));

    let state = deliver(
        state,
        events::MESSAGE,
        json!({"text": "hi", "payload": {"workflow": "chat", "project": "elsewhere"}}),
    );
    assert_eq!(state.active_workflow(), Some("chat"));
    assert_eq!(state.active_project(), Some("projects/x"));
}

#[test]
fn message_defaults_to_assistant_kind() {
    init_logging();
    let state = deliver(connected(), events::MESSAGE, json!({"text": "hello"}));
    let last = state.messages().last().unwrap();

    assert_eq!(last.kind, MessageKind::Assistant);
    assert_eq!(last.text, "hello");
    assert_eq!(last.payload, None);

    let state = deliver(state, events::MESSAGE, json!({"type": "bogus"}));
    let last = state.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Assistant);
    assert_eq!(last.text, "");
}

#[test]
fn terminal_payload_status_sets_pipeline_done() {
    init_logging();
    let state = deliver(
        connected(),
        events::MESSAGE,
        json!({"text": "[analyze] completed", "type": "result",
               "payload": {"workflow": "analyze", "status": "completed", "stage": 2}}),
    );
    let done = state.pipeline_done().expect("pipeline done");
    assert_eq!(done.status.as_deref(), Some("completed"));
    assert_eq!(done.record["stage"], json!(2));

    let chat_only = deliver(
        connected(),
        events::MESSAGE,
        json!({"text": "hi", "payload": {"workflow": "chat", "status": "completed"}}),
    );
    assert!(chat_only.pipeline_done().is_none());
}

#[test]
fn open_result_statuses_do_not_finish_the_pipeline() {
    init_logging();
    let mut state = connected();
    for status in ["needs_project", "needs_clarification", "running"] {
        state = deliver(
            state,
            events::MESSAGE,
            json!({"text": status, "type": "result",
                   "payload": {"workflow": "build", "project": "projects/x", "status": status}}),
        );
        assert!(state.pipeline_done().is_none(), "{status} is not terminal");
    }
    assert_eq!(state.active_project(), Some("projects/x"));

    let state = deliver(
        state,
        events::MESSAGE,
        json!({"text": "done", "payload": {"workflow": "build", "status": "critical_failure"}}),
    );
    assert_eq!(
        state.pipeline_done().and_then(|d| d.status.as_deref()),
        Some("critical_failure")
    );
}

#[test]
fn log_defaults_and_msg_fallback() {
    init_logging();
    let state = deliver(SessionState::new(), events::LOG, json!({"msg": "from msg"}));
    let state = deliver(state, events::LOG, json!({"message": "warned", "level": "WARNING"}));

    let entries: Vec<_> = state
        .log()
        .iter()
        .map(|e| (e.level, e.message.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![(LogLevel::Info, "from msg"), (LogLevel::Warning, "warned")]
    );
}

#[test]
fn tool_call_renders_truncated_json_args() {
    init_logging();
    let state = deliver(
        SessionState::new(),
        events::TOOL_CALL,
        json!({"tool": "read_file", "args": {"path": "a.py"}}),
    );

    assert_eq!(state.log().len(), 1);
    let entry = &state.log()[0];
    assert_eq!(entry.level, LogLevel::Tool);
    assert!(entry.message.starts_with("→ read_file"));
    assert_eq!(entry.message, r#"→ read_file {"path":"a.py"}"#);

    let long = "x".repeat(500);
    let state = deliver(
        state,
        events::TOOL_CALL,
        json!({"tool": "write_file", "args": {"content": long}}),
    );
    let entry = state.log().back().unwrap();
    let rendered = entry.message.trim_start_matches("→ write_file ");
    assert_eq!(rendered.chars().count(), 120);
    assert!(rendered.starts_with(r#"{"content":"xxx"#));
}

#[test]
fn tool_result_uses_string_verbatim() {
    init_logging();
    let long = "y".repeat(300);
    let state = deliver(
        SessionState::new(),
        events::TOOL_RESULT,
        json!({"tool": "run", "result": long}),
    );
    let entry = &state.log()[0];

    assert_eq!(entry.level, LogLevel::Tool);
    assert_eq!(entry.message, format!("← run: {}", "y".repeat(120)));
}

#[test]
fn status_is_replaced_wholesale() {
    init_logging();
    let state = deliver(
        SessionState::new(),
        events::STATUS,
        json!({"phase": "planning", "description": "drafting plan"}),
    );
    let state = deliver(
        state,
        events::STATUS,
        json!({"step": 2, "total": 5, "description": "write tests"}),
    );

    assert_eq!(
        state.status(),
        Some(&StatusSnapshot {
            phase: None,
            step: 2,
            total: 5,
            description: Some("write tests".into()),
            status: None,
        })
    );
}

#[test]
fn done_always_clears_status() {
    init_logging();
    let state = deliver(
        SessionState::new(),
        events::STATUS,
        json!({"phase": "execute", "step": 1, "total": 3}),
    );
    let state = deliver(state, events::DONE, json!({"status": "failed"}));

    assert!(state.status().is_none());
    assert_eq!(
        state.pipeline_done().and_then(|d| d.status.as_deref()),
        Some("failed")
    );

    let state = deliver(state, events::DONE, Value::Null);
    assert!(state.status().is_none());
}

#[test]
fn confirm_replaces_pending_request() {
    init_logging();
    let state = deliver(
        connected(),
        events::CONFIRM,
        json!({"type": "tool", "message": "Confirm write_file", "tool": "write_file", "args": "{'path': 'a'}"}),
    );
    let state = deliver(
        state,
        events::CONFIRM,
        json!({"type": "review", "message": "Review the plan"}),
    );

    let pending = state.pending_confirmation().expect("pending");
    assert_eq!(pending.kind, "review");
    assert_eq!(pending.message, "Review the plan");
    assert_eq!(pending.tool, None);
    assert_eq!(pending.args, None);
}

#[test]
fn error_uses_fallback_text() {
    init_logging();
    let state = deliver(connected(), events::ERROR, json!({"error": "boom"}));
    let state = deliver(state, events::ERROR, json!({}));

    let errors: Vec<_> = state
        .messages()
        .iter()
        .filter(|m| m.kind == MessageKind::Error)
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(errors, vec!["boom", "Unknown error"]);
}

#[test]
fn changes_track_touched_cells() {
    init_logging();
    let mut state = connected();
    let changes = state.consume_changes();
    assert!(changes.contains(&StoreCell::Connection));
    assert!(changes.contains(&StoreCell::Messages));

    let mut state = deliver(state, events::STATUS, json!({"phase": "x"}));
    let changes = state.consume_changes();
    assert_eq!(changes.into_iter().collect::<Vec<_>>(), vec![StoreCell::Status]);
    assert!(!state.consume_dirty());
}
