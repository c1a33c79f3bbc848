use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::view_model::SessionView;

pub type MessageId = u64;

/// Workflow tag the backend uses for plain conversation.
pub const CHAT_WORKFLOW: &str = "chat";
pub const DEFAULT_LOG_CAPACITY: usize = 500;
pub const DEFAULT_PREVIEW_CHARS: usize = 120;

/// Result statuses that end a pipeline run. Anything else, such as
/// `needs_clarification` or `needs_project`, leaves the run open.
pub const TERMINAL_STATUSES: &[&str] = &[
    "completed",
    "failed",
    "partial",
    "partial_success",
    "critical_failure",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
    System,
    Error,
    Review,
    Result,
}

impl MessageKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            "error" => Some(Self::Error),
            "review" => Some(Self::Review),
            "result" => Some(Self::Result),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Error => "error",
            Self::Review => "review",
            Self::Result => "result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Tool,
    Warning,
    Error,
}

impl LogLevel {
    /// Accepts the backend's Python level names as well as the console's own.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" | "CRITICAL" | "FATAL" => Some(Self::Error),
            "TOOL" => Some(Self::Tool),
            "DEBUG" => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Tool => "TOOL",
            Self::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub phase: Option<String>,
    pub step: i64,
    pub total: i64,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl StatusSnapshot {
    /// One-line rendering, e.g. `planning 2/5 write tests (running)`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(phase) = self.phase.as_deref().filter(|p| !p.is_empty()) {
            parts.push(phase.to_string());
        }
        if self.total > 0 {
            parts.push(format!("{}/{}", self.step, self.total));
        } else if self.step > 0 {
            parts.push(format!("step {}", self.step));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            parts.push(description.to_string());
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("({status})"));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmRequest {
    /// Backend-defined category, `tool` or `review` in practice.
    pub kind: String,
    pub message: String,
    pub tool: Option<String>,
    pub args: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDone {
    pub status: Option<String>,
    pub record: Value,
}

impl PipelineDone {
    pub fn from_record(record: Value) -> Self {
        let status = record
            .get("status")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        Self { status, record }
    }

    pub fn is_terminal_status(status: &str) -> bool {
        TERMINAL_STATUSES.contains(&status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of retained log entries; oldest are evicted first.
    pub log_capacity: usize,
    /// Maximum characters shown for tool call arguments and results.
    pub preview_chars: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

/// Observable cells of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreCell {
    Connection,
    Messages,
    Log,
    Status,
    Confirmation,
    Workflow,
    Project,
    PipelineDone,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    limits: StoreLimits,
    connected: bool,
    messages: Vec<ChatMessage>,
    next_message_id: MessageId,
    log: VecDeque<LogEntry>,
    log_appended: u64,
    status: Option<StatusSnapshot>,
    pending_confirmation: Option<ConfirmRequest>,
    active_workflow: Option<String>,
    active_project: Option<String>,
    pipeline_done: Option<PipelineDone>,
    changes: BTreeSet<StoreCell>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            connected: self.connected,
            message_count: self.messages.len(),
            last_message_id: self.messages.last().map(|m| m.id),
            log_len: self.log.len(),
            status: self.status.clone(),
            pending_confirmation: self.pending_confirmation.clone(),
            active_workflow: self.active_workflow.clone(),
            active_project: self.active_project.clone(),
            pipeline_status: self.pipeline_done.as_ref().map(|done| {
                done.status.clone().unwrap_or_else(|| "done".to_string())
            }),
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages with an id greater than `after`, in arrival order.
    pub fn messages_after(&self, after: Option<MessageId>) -> &[ChatMessage] {
        match after {
            None => &self.messages,
            Some(after) => {
                let start = self.messages.partition_point(|m| m.id <= after);
                &self.messages[start..]
            }
        }
    }

    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Total entries ever appended; unaffected by eviction and `clear_log`.
    pub fn log_appended(&self) -> u64 {
        self.log_appended
    }

    pub fn status(&self) -> Option<&StatusSnapshot> {
        self.status.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmRequest> {
        self.pending_confirmation.as_ref()
    }

    pub fn active_workflow(&self) -> Option<&str> {
        self.active_workflow.as_deref()
    }

    pub fn active_project(&self) -> Option<&str> {
        self.active_project.as_deref()
    }

    pub fn pipeline_done(&self) -> Option<&PipelineDone> {
        self.pipeline_done.as_ref()
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    /// The per-cell change set is left untouched.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Drains the set of cells touched since the last call.
    pub fn consume_changes(&mut self) -> BTreeSet<StoreCell> {
        self.dirty = false;
        std::mem::take(&mut self.changes)
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        if self.connected != connected {
            self.connected = connected;
            self.touch(StoreCell::Connection);
        }
        if !connected {
            self.set_active_workflow(None);
        }
    }

    pub(crate) fn push_message(
        &mut self,
        kind: MessageKind,
        text: impl Into<String>,
        payload: Option<Value>,
    ) -> MessageId {
        self.next_message_id += 1;
        let id = self.next_message_id;
        self.messages.push(ChatMessage {
            id,
            kind,
            text: text.into(),
            timestamp: Utc::now(),
            payload,
        });
        self.touch(StoreCell::Messages);
        id
    }

    pub(crate) fn clear_messages(&mut self) {
        self.messages.clear();
        self.touch(StoreCell::Messages);
        self.set_pipeline_done(None);
    }

    pub(crate) fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.limits.log_capacity == 0 {
            return;
        }
        while self.log.len() >= self.limits.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
        self.log_appended += 1;
        self.touch(StoreCell::Log);
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
        self.touch(StoreCell::Log);
    }

    pub(crate) fn set_status(&mut self, status: Option<StatusSnapshot>) {
        self.status = status;
        self.touch(StoreCell::Status);
    }

    pub(crate) fn set_pending_confirmation(&mut self, request: Option<ConfirmRequest>) {
        self.pending_confirmation = request;
        self.touch(StoreCell::Confirmation);
    }

    pub(crate) fn set_active_workflow(&mut self, workflow: Option<String>) {
        if self.active_workflow != workflow {
            self.active_workflow = workflow;
            self.touch(StoreCell::Workflow);
        }
    }

    pub(crate) fn set_active_project(&mut self, project: Option<String>) {
        if self.active_project != project {
            self.active_project = project;
            self.touch(StoreCell::Project);
        }
    }

    pub(crate) fn set_pipeline_done(&mut self, done: Option<PipelineDone>) {
        if self.pipeline_done.is_none() && done.is_none() {
            return;
        }
        self.pipeline_done = done;
        self.touch(StoreCell::PipelineDone);
    }

    fn touch(&mut self, cell: StoreCell) {
        self.changes.insert(cell);
        self.dirty = true;
    }
}

/// Cuts `text` to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
