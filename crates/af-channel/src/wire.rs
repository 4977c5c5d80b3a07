//! Wire format
//!
//! `{ "event": string, "data"?: object, "receiver"?: string | string[] }`
//!
//! A missing receiver means broadcast.

use serde::{Deserialize, Serialize};

use af_core::ChannelId;

use crate::error::{ChannelError, ChannelResult};
use crate::event::Event;

/// Raw receiver field: one channel name or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireReceiver {
    One(String),
    Many(Vec<String>),
}

/// Untyped message as it travels between processes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<WireReceiver>,
}

impl WireMessage {
    /// Parse the JSON envelope (payload not yet validated)
    pub fn parse(json: &str) -> ChannelResult<Self> {
        serde_json::from_str(json).map_err(|e| ChannelError::Malformed(e.to_string()))
    }

    pub fn from_event(event: &Event, receiver: &Receiver) -> Self {
        Self {
            event: event.name().to_string(),
            data: event.data(),
            receiver: receiver.to_wire(),
        }
    }

    pub fn to_json(&self) -> ChannelResult<String> {
        serde_json::to_string(self).map_err(|e| ChannelError::Malformed(e.to_string()))
    }

    /// Validate into a typed event and receiver
    pub fn into_parts(self) -> ChannelResult<(Event, Receiver)> {
        let receiver = Receiver::from_wire(self.receiver)?;
        let event = Event::from_wire(&self.event, self.data)?;
        Ok((event, receiver))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECEIVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Who a send is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Every registered client, the sender's own channel included
    All,
    One(ChannelId),
    /// Ordered set; duplicates collapse
    Many(Vec<ChannelId>),
}

impl Receiver {
    /// Target channels in order without duplicates, `None` for broadcast
    pub fn channels(&self) -> Option<Vec<ChannelId>> {
        match self {
            Receiver::All => None,
            Receiver::One(channel) => Some(vec![*channel]),
            Receiver::Many(list) => {
                let mut out: Vec<ChannelId> = Vec::with_capacity(list.len());
                for channel in list {
                    if !out.contains(channel) {
                        out.push(*channel);
                    }
                }
                Some(out)
            }
        }
    }

    pub fn includes(&self, channel: ChannelId) -> bool {
        match self {
            Receiver::All => true,
            Receiver::One(c) => *c == channel,
            Receiver::Many(list) => list.contains(&channel),
        }
    }

    pub fn from_wire(wire: Option<WireReceiver>) -> ChannelResult<Self> {
        let parse = |name: &str| {
            name.parse::<ChannelId>()
                .map_err(|_| ChannelError::UnknownChannel(name.to_string()))
        };
        match wire {
            None => Ok(Receiver::All),
            Some(WireReceiver::One(name)) => Ok(Receiver::One(parse(name.as_str())?)),
            Some(WireReceiver::Many(names)) => {
                let channels = names
                    .iter()
                    .map(|n| parse(n.as_str()))
                    .collect::<ChannelResult<Vec<_>>>()?;
                Ok(Receiver::Many(channels))
            }
        }
    }

    pub fn to_wire(&self) -> Option<WireReceiver> {
        match self {
            Receiver::All => None,
            Receiver::One(c) => Some(WireReceiver::One(c.name().to_string())),
            Receiver::Many(list) => Some(WireReceiver::Many(
                list.iter().map(|c| c.name().to_string()).collect(),
            )),
        }
    }
}

impl From<ChannelId> for Receiver {
    fn from(channel: ChannelId) -> Self {
        Receiver::One(channel)
    }
}

impl From<Vec<ChannelId>> for Receiver {
    fn from(channels: Vec<ChannelId>) -> Self {
        Receiver::Many(channels)
    }
}

impl From<&[ChannelId]> for Receiver {
    fn from(channels: &[ChannelId]) -> Self {
        Receiver::Many(channels.to_vec())
    }
}

impl<const N: usize> From<[ChannelId; N]> for Receiver {
    fn from(channels: [ChannelId; N]) -> Self {
        Receiver::Many(channels.to_vec())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
