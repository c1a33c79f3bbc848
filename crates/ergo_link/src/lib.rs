//! Console link: backend transport, wire codec and the session binding.
mod channel;
mod health;
mod lazy;
mod link;
mod session;
mod types;
pub mod wire;

pub use channel::Channel;
pub use health::{HealthProbe, HealthReport, ReqwestHealthProbe};
pub use lazy::LazyLink;
pub use link::{socket_url, LinkHandle};
pub use session::Session;
pub use types::{LinkError, LinkEvent, LinkSettings};
