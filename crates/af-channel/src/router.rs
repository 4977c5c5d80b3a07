//! Channel Router
//!
//! In-process relay between display controllers:
//! - `Router`: cloneable handle holding the channel registry
//! - `ChannelClient`: one registration, with its own FIFO inbox
//!
//! ## Delivery
//!
//! Best-effort, at most once. A send reaches the clients registered at
//! the moment it runs; channels with no client drop the event silently.
//! One sender's events to one receiver keep their send order.

use crossbeam_channel::{Receiver as Inbox, Sender, TryRecvError};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use af_core::ChannelId;

use crate::error::ChannelResult;
use crate::event::Event;
use crate::wire::{Receiver, WireMessage};

// ═══════════════════════════════════════════════════════════════════════════════
// ENVELOPE
// ═══════════════════════════════════════════════════════════════════════════════

/// A delivered event
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Sending channel, `None` for wire injections
    pub from: Option<ChannelId>,
    pub event: Event,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTER
// ═══════════════════════════════════════════════════════════════════════════════

struct Subscriber {
    id: u64,
    tx: Sender<Envelope>,
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    /// `send` calls
    pub sent: u64,
    /// Envelopes placed in an inbox
    pub delivered: u64,
    /// Named channels that had no client
    pub dropped: u64,
}

struct RouterShared {
    channels: RwLock<HashMap<ChannelId, Vec<Subscriber>>>,
    next_client_id: AtomicU64,
    sent: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Channel registry and relay
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Router {
    shared: Arc<RouterShared>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("channels", &self.channels())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RouterShared {
                channels: RwLock::new(HashMap::new()),
                next_client_id: AtomicU64::new(1),
                sent: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Register a client under `channel`
    ///
    /// The channel is created on first registration.
    pub fn register(&self, channel: ChannelId) -> ChannelClient {
        let id = self.shared.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = crossbeam_channel::unbounded();
        self.shared
            .channels
            .write()
            .entry(channel)
            .or_default()
            .push(Subscriber { id, tx });
        log::debug!("[Router] Client {id} registered on '{channel}'");

        ChannelClient {
            router: self.clone(),
            channel,
            id,
            inbox: rx,
        }
    }

    fn unregister(&self, channel: ChannelId, id: u64) {
        let mut channels = self.shared.channels.write();
        if let Some(clients) = channels.get_mut(&channel) {
            clients.retain(|c| c.id != id);
            if clients.is_empty() {
                channels.remove(&channel);
            }
        }
        log::debug!("[Router] Client {id} left '{channel}'");
    }

    /// Deliver `event` to every client under the receiver's channels
    ///
    /// Returns the number of clients reached.
    pub fn send(&self, from: Option<ChannelId>, receiver: &Receiver, event: Event) -> usize {
        let targets = receiver
            .channels()
            .unwrap_or_else(|| ChannelId::ALL.to_vec());
        let channels = self.shared.channels.read();
        let mut delivered = 0;
        let mut dropped = 0;

        for channel in targets {
            let Some(clients) = channels.get(&channel) else {
                if !matches!(receiver, Receiver::All) {
                    log::debug!("[Router] '{}' → '{channel}': no client", event.name());
                    dropped += 1;
                }
                continue;
            };
            for client in clients {
                let envelope = Envelope {
                    from,
                    event: event.clone(),
                };
                if client.tx.send(envelope).is_ok() {
                    delivered += 1;
                }
            }
        }
        drop(channels);

        log::debug!(
            "[Router] '{}' from {:?} reached {delivered} client(s)",
            event.name(),
            from
        );
        self.shared.sent.fetch_add(1, Ordering::Relaxed);
        self.shared
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.shared.dropped.fetch_add(dropped, Ordering::Relaxed);
        delivered
    }

    /// Validate a wire message and deliver it
    ///
    /// Nothing is delivered unless the whole message validates.
    pub fn send_wire(&self, json: &str) -> ChannelResult<usize> {
        let (event, receiver) = WireMessage::parse(json)
            .and_then(WireMessage::into_parts)
            .inspect_err(|e| log::warn!("[Router] Rejected wire message: {e}"))?;
        Ok(self.send(None, &receiver, event))
    }

    /// Registered clients on a channel
    pub fn client_count(&self, channel: ChannelId) -> usize {
        self.shared
            .channels
            .read()
            .get(&channel)
            .map_or(0, Vec::len)
    }

    /// Channels with at least one client
    pub fn channels(&self) -> Vec<ChannelId> {
        let mut out: Vec<ChannelId> = self.shared.channels.read().keys().copied().collect();
        out.sort();
        out
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            sent: self.shared.sent.load(Ordering::Relaxed),
            delivered: self.shared.delivered.load(Ordering::Relaxed),
            dropped: self.shared.dropped.load(Ordering::Relaxed),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHANNEL CLIENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A display's registration; unregisters on drop
pub struct ChannelClient {
    router: Router,
    channel: ChannelId,
    id: u64,
    inbox: Inbox<Envelope>,
}

impl std::fmt::Debug for ChannelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelClient")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .field("pending", &self.inbox.len())
            .finish()
    }
}

impl ChannelClient {
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Send from this client's channel
    pub fn send(&self, receiver: impl Into<Receiver>, event: Event) -> usize {
        self.router
            .send(Some(self.channel), &receiver.into(), event)
    }

    /// Send to every channel, this one included
    pub fn broadcast(&self, event: Event) -> usize {
        self.router.send(Some(self.channel), &Receiver::All, event)
    }

    /// Next queued envelope, if any
    pub fn try_recv(&self) -> Option<Envelope> {
        match self.inbox.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Everything queued, in arrival order
    pub fn drain(&self) -> Vec<Envelope> {
        self.inbox.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl Drop for ChannelClient {
    fn drop(&mut self) {
        self.router.unregister(self.channel, self.id);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Visibility;

    #[test]
    fn test_register_creates_and_drop_removes_channel() {
        let router = Router::new();
        assert!(router.channels().is_empty());

        let a = router.register(ChannelId::Combi);
        let b = router.register(ChannelId::Combi);
        assert_eq!(router.client_count(ChannelId::Combi), 2);

        drop(a);
        assert_eq!(router.channels(), vec![ChannelId::Combi]);
        drop(b);
        assert!(router.channels().is_empty());
    }

    #[test]
    fn test_every_client_on_channel_receives() {
        let router = Router::new();
        let a = router.register(ChannelId::Score);
        let b = router.register(ChannelId::Score);
        let sender = router.register(ChannelId::Scene);

        let n = sender.send(ChannelId::Score, Event::Show(Visibility::IMMEDIATE));
        assert_eq!(n, 2);
        assert_eq!(a.drain().len(), 1);
        assert_eq!(b.try_recv().map(|e| e.from), Some(Some(ChannelId::Scene)));
    }

    #[test]
    fn test_duplicate_receivers_collapse() {
        let router = Router::new();
        let combi = router.register(ChannelId::Combi);
        let n = router.send(
            None,
            &Receiver::Many(vec![ChannelId::Combi, ChannelId::Combi]),
            Event::Farkle,
        );
        assert_eq!(n, 1);
        assert_eq!(combi.pending(), 1);
    }

    #[test]
    fn test_stats_count_drops() {
        let router = Router::new();
        let _combi = router.register(ChannelId::Combi);
        router.send(None, &Receiver::from([ChannelId::Combi, ChannelId::Bulbs]), Event::Reset);
        let stats = router.stats();
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.dropped, 1);
    }
}
