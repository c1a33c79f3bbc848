use std::collections::BTreeSet;

use chrono::Local;
use ergo_core::{ChatMessage, LogEntry, MessageId, MessageKind, SessionState, StoreCell};

/// Tracks what has already been printed so each pass only emits what is new.
#[derive(Debug, Default)]
pub struct Renderer {
    show_log: bool,
    last_message: Option<MessageId>,
    log_seen: u64,
}

impl Renderer {
    pub fn new(show_log: bool) -> Self {
        Self {
            show_log,
            ..Self::default()
        }
    }

    /// Lines describing the changed cells, in a stable order.
    pub fn render(&mut self, state: &SessionState, changes: &BTreeSet<StoreCell>) -> Vec<String> {
        let mut lines = Vec::new();

        if changes.contains(&StoreCell::Messages) {
            let fresh = state.messages_after(self.last_message);
            lines.extend(fresh.iter().map(format_message));
            if let Some(last) = fresh.last() {
                self.last_message = Some(last.id);
            }
        }

        if changes.contains(&StoreCell::Log) {
            let appended = state.log_appended();
            let unseen = appended.saturating_sub(self.log_seen) as usize;
            self.log_seen = appended;
            if self.show_log {
                let log = state.log();
                let skip = log.len().saturating_sub(unseen);
                lines.extend(log.iter().skip(skip).map(format_log));
            }
        }

        if changes.contains(&StoreCell::Workflow) || changes.contains(&StoreCell::Project) {
            lines.push(state.view().header());
        }

        if changes.contains(&StoreCell::Status) {
            match state.status() {
                Some(status) => lines.push(format!("  … {}", status.summary())),
                None => lines.push("  … idle".to_string()),
            }
        }

        if changes.contains(&StoreCell::Confirmation) {
            if let Some(request) = state.pending_confirmation() {
                let tool = request
                    .tool
                    .as_deref()
                    .map(|tool| format!(" [{tool}]"))
                    .unwrap_or_default();
                lines.push(format!(
                    "? {}{} (answer /yes or /no)",
                    request.message, tool
                ));
            }
        }

        if changes.contains(&StoreCell::PipelineDone) {
            if let Some(done) = state.pipeline_done() {
                let status = done.status.as_deref().unwrap_or("done");
                lines.push(format!("== pipeline finished: {status} =="));
            }
        }

        lines
    }
}

fn format_message(message: &ChatMessage) -> String {
    let stamp = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let who = match message.kind {
        MessageKind::User => "you",
        other => other.as_str(),
    };
    format!("[{stamp}] {who}> {}", message.text)
}

fn format_log(entry: &LogEntry) -> String {
    format!("  · {:<7} {}", entry.level.as_str(), entry.message)
}
