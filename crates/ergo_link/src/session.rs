use ergo_core::{
    events, update, ConfirmRequest, Effect, InboundEvent, Msg, SessionState, StoreLimits,
};
use ergo_logging::{ergo_debug, ergo_trace};
use serde_json::{Map, Value};

use crate::{Channel, LinkEvent};

/// Binds a session store to an outbound channel.
///
/// Inbound events are decoded and applied to the store; user operations go
/// through the same pure update and whatever it emits is handed to the
/// channel. Outbound operations are silent no-ops while disconnected.
pub struct Session<C> {
    state: SessionState,
    channel: C,
}

impl<C: Channel> Session<C> {
    pub fn new(channel: C) -> Self {
        Self::with_limits(channel, StoreLimits::default())
    }

    pub fn with_limits(channel: C, limits: StoreLimits) -> Self {
        Self {
            state: SessionState::with_limits(limits),
            channel,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access for draining change tracking.
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Applies a named backend event. Returns `false` for names the console
    /// does not know, which are otherwise ignored.
    pub fn handle_event(&mut self, name: &str, data: &Value) -> bool {
        match InboundEvent::decode(name, data) {
            Some(event) => {
                ergo_trace!("Inbound `{}`", name);
                self.dispatch(Msg::Inbound(event));
                true
            }
            None => {
                ergo_debug!("Ignoring unknown event `{}`", name);
                false
            }
        }
    }

    pub fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                self.handle_event(events::CONNECT, &Value::Null);
            }
            LinkEvent::Disconnected { reason } => {
                ergo_debug!("Link lost: {}", reason);
                self.handle_event(events::DISCONNECT, &Value::Null);
            }
            LinkEvent::Event { name, data } => {
                self.handle_event(&name, &data);
            }
        }
    }

    pub fn send_input(&mut self, text: impl Into<String>) {
        self.dispatch(Msg::SendInput(text.into()));
    }

    pub fn send_confirm_response(&mut self, request: ConfirmRequest, accepted: bool) {
        self.dispatch(Msg::ConfirmResponse { request, accepted });
    }

    pub fn send_command(&mut self, name: impl Into<String>, fields: Map<String, Value>) {
        self.dispatch(Msg::SendCommand {
            name: name.into(),
            fields,
        });
    }

    pub fn clear_messages(&mut self) {
        self.dispatch(Msg::ClearMessages);
    }

    pub fn clear_log(&mut self) {
        self.dispatch(Msg::ClearLog);
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::Emit(event) => {
                    ergo_debug!("Emit `{}`", event.name());
                    self.channel.emit(&event);
                }
            }
        }
    }
}
