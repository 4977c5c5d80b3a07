//! Display channels
//!
//! Every display process registers under exactly one of these names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Closed set of channels a client can register under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum ChannelId {
    /// Paytable display
    Combi = 0,
    /// Score screen
    Score = 1,
    /// Slot machine: player input and LED rig
    Machine = 2,
    /// Light-gun mini game
    Shooter = 3,
    /// Physical button panel
    PhysicalDebug = 4,
    /// Main scene lifecycle
    Scene = 5,
    /// Multiplier bulbs
    Bulbs = 6,
}

impl ChannelId {
    /// Every channel, in declaration order
    pub const ALL: [ChannelId; 7] = [
        ChannelId::Combi,
        ChannelId::Score,
        ChannelId::Machine,
        ChannelId::Shooter,
        ChannelId::PhysicalDebug,
        ChannelId::Scene,
        ChannelId::Bulbs,
    ];

    /// Convert from u8 index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            ChannelId::Combi => "combi",
            ChannelId::Score => "score",
            ChannelId::Machine => "machine",
            ChannelId::Shooter => "shooter",
            ChannelId::PhysicalDebug => "physical-debug",
            ChannelId::Scene => "scene",
            ChannelId::Bulbs => "bulbs",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| CoreError::UnknownChannel(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
