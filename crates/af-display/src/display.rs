//! Display trait: the per-frame contract every controller follows

use af_channel::{ChannelClient, Event};
use af_core::ChannelId;

/// A display controller bound to one channel
pub trait Display {
    fn client(&self) -> &ChannelClient;

    /// React to one delivered event
    fn handle_event(&mut self, event: &Event);

    /// Advance local transitions by `dt` seconds
    fn advance(&mut self, dt: f32);

    fn channel(&self) -> ChannelId {
        self.client().channel()
    }

    /// Drain the inbox in arrival order, then advance
    ///
    /// Returns the number of events handled.
    fn pump(&mut self, dt: f32) -> usize {
        let envelopes = self.client().drain();
        let handled = envelopes.len();
        for envelope in envelopes {
            self.handle_event(&envelope.event);
        }
        self.advance(dt);
        handled
    }
}
