use std::cell::OnceCell;

use ergo_core::OutboundEvent;
use ergo_logging::ergo_debug;

use crate::{Channel, LinkError, LinkEvent, LinkHandle, LinkSettings};

/// Opens the backend link on first use and hands out that same link on
/// every later request.
pub struct LazyLink {
    settings: LinkSettings,
    link: OnceCell<LinkHandle>,
}

impl LazyLink {
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            link: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Returns the link, dialing the backend if this is the first call.
    pub fn get(&self) -> Result<&LinkHandle, LinkError> {
        if let Some(link) = self.link.get() {
            return Ok(link);
        }
        let handle = LinkHandle::connect(self.settings.clone())?;
        Ok(self.link.get_or_init(|| handle))
    }

    pub fn is_open(&self) -> bool {
        self.link.get().is_some()
    }

    pub fn try_recv(&self) -> Option<LinkEvent> {
        self.link.get().and_then(LinkHandle::try_recv)
    }
}

impl Channel for LazyLink {
    fn emit(&self, event: &OutboundEvent) {
        match self.link.get() {
            Some(link) => link.emit(event.name(), event.payload()),
            None => ergo_debug!("No link open; dropping `{}`", event.name()),
        }
    }
}
