//! Wire names of the events exchanged with the backend.

pub const LOG: &str = "log";
pub const TOOL_CALL: &str = "tool_call";
pub const TOOL_RESULT: &str = "tool_result";
pub const MESSAGE: &str = "message";
pub const STATUS: &str = "status";
pub const CONFIRM: &str = "confirm";
pub const DONE: &str = "done";
pub const ERROR: &str = "error";

pub const CONFIRM_RESPONSE: &str = "confirm_response";
pub const INPUT: &str = "input";
pub const COMMAND: &str = "command";

/// Synthetic names the transport uses for connection lifecycle changes.
pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
