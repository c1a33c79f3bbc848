use ergo_core::OutboundEvent;

use crate::LinkHandle;

/// Outbound half of the event channel, as seen by a [`crate::Session`].
pub trait Channel {
    fn emit(&self, event: &OutboundEvent);
}

impl Channel for LinkHandle {
    fn emit(&self, event: &OutboundEvent) {
        LinkHandle::emit(self, event.name(), event.payload());
    }
}

impl<C: Channel + ?Sized> Channel for &C {
    fn emit(&self, event: &OutboundEvent) {
        (**self).emit(event);
    }
}
