use crate::{ConfirmRequest, MessageId, StatusSnapshot};

/// Render-ready summary of the store; message and log bodies are read
/// straight from `SessionState`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub connected: bool,
    pub message_count: usize,
    pub last_message_id: Option<MessageId>,
    pub log_len: usize,
    pub status: Option<StatusSnapshot>,
    pub pending_confirmation: Option<ConfirmRequest>,
    pub active_workflow: Option<String>,
    pub active_project: Option<String>,
    pub pipeline_status: Option<String>,
}

impl SessionView {
    /// Header line: connection, workflow and project at a glance.
    pub fn header(&self) -> String {
        let link = if self.connected { "online" } else { "offline" };
        let workflow = self.active_workflow.as_deref().unwrap_or("-");
        let project = self.active_project.as_deref().unwrap_or("-");
        format!("[{link}] workflow: {workflow} | project: {project}")
    }
}
