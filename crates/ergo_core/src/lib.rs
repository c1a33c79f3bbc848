//! Console core: pure session store driven by backend events and user actions.
mod effect;
pub mod events;
mod inbound;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{ConfirmAnswer, Effect, OutboundEvent};
pub use inbound::InboundEvent;
pub use msg::Msg;
pub use state::{
    truncate_chars, ChatMessage, ConfirmRequest, LogEntry, LogLevel, MessageId, MessageKind,
    PipelineDone, SessionState, StatusSnapshot, StoreCell, StoreLimits, CHAT_WORKFLOW,
    DEFAULT_LOG_CAPACITY, DEFAULT_PREVIEW_CHARS, TERMINAL_STATUSES,
};
pub use update::update;
pub use view_model::SessionView;
