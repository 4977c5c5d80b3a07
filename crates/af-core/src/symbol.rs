//! Symbols, paytable tiers and multipliers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SymbolKind {
    /// Regular paying symbol with a base value
    Standard { value: i64 },
    /// Penalty symbol; three or more is a farkle
    Malus,
    /// Bonus symbol; three or more grants spin tokens
    Special,
}

/// A wheel symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Display glyph (e.g. "🍒", "7")
    pub name: String,
    /// Classification
    #[serde(flatten)]
    pub kind: SymbolKind,
}

impl SymbolDef {
    /// Create a standard symbol
    pub fn standard(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Standard { value },
        }
    }

    /// Create a malus symbol
    pub fn malus(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Malus,
        }
    }

    /// Create a special symbol
    pub fn special(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Special,
        }
    }

    /// Base value for standard symbols
    pub fn base_value(&self) -> Option<i64> {
        match self.kind {
            SymbolKind::Standard { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_malus(&self) -> bool {
        matches!(self.kind, SymbolKind::Malus)
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, SymbolKind::Special)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIER (paytable column)
// ═══════════════════════════════════════════════════════════════════════════════

/// Paytable column, keyed by occurrence count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    X1 = 0,
    X3 = 1,
    X4 = 2,
    X5 = 3,
}

impl Tier {
    /// Columns in display order
    pub const ALL: [Tier; 4] = [Tier::X1, Tier::X3, Tier::X4, Tier::X5];

    /// Column index
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Occurrence count this column pays for
    pub fn count(&self) -> u8 {
        match self {
            Tier::X1 => 1,
            Tier::X3 => 3,
            Tier::X4 => 4,
            Tier::X5 => 5,
        }
    }

    /// Label used in `update-combi` values
    pub fn label(&self) -> &'static str {
        match self {
            Tier::X1 => "x1",
            Tier::X3 => "x3",
            Tier::X4 => "x4",
            Tier::X5 => "x5",
        }
    }

    /// Column for an occurrence count; a pair shares the single column
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            1 | 2 => Some(Tier::X1),
            3 => Some(Tier::X3),
            4 => Some(Tier::X4),
            5 => Some(Tier::X5),
            _ => None,
        }
    }

    /// Parse a highlight value, treating "x2" as "x1"
    pub fn from_highlight(value: &str) -> Option<Self> {
        match value {
            "x2" => Some(Tier::X1),
            other => other.parse().ok(),
        }
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|t| t.label() == s)
            .ok_or_else(|| CoreError::InvalidTier(s.to_string()))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MULTIPLIER (game state)
// ═══════════════════════════════════════════════════════════════════════════════

/// Score multiplier; never "x2"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Multiplier {
    #[default]
    X1 = 0,
    X3 = 1,
    X4 = 2,
    X5 = 3,
}

impl Multiplier {
    pub const ALL: [Multiplier; 4] = [
        Multiplier::X1,
        Multiplier::X3,
        Multiplier::X4,
        Multiplier::X5,
    ];

    /// Score factor
    pub fn factor(&self) -> i64 {
        match self {
            Multiplier::X1 => 1,
            Multiplier::X3 => 3,
            Multiplier::X4 => 4,
            Multiplier::X5 => 5,
        }
    }

    /// Event name sent to the bulbs
    pub fn event_name(&self) -> &'static str {
        match self {
            Multiplier::X1 => "x1",
            Multiplier::X3 => "x3",
            Multiplier::X4 => "x4",
            Multiplier::X5 => "x5",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.event_name() == name)
    }

    /// Next bulb up, saturating at x5
    pub fn next(&self) -> Self {
        match self {
            Multiplier::X1 => Multiplier::X3,
            Multiplier::X3 => Multiplier::X4,
            Multiplier::X4 | Multiplier::X5 => Multiplier::X5,
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x2_aliases_x1_for_highlight_only() {
        assert_eq!(Tier::from_highlight("x2"), Some(Tier::X1));
        assert_eq!(Tier::from_highlight("x4"), Some(Tier::X4));
        assert_eq!(Tier::from_highlight("x9"), None);
        assert!("x2".parse::<Tier>().is_err());
        assert_eq!(Multiplier::from_event_name("x2"), None);
    }

    #[test]
    fn test_tier_counts() {
        let counts: Vec<u8> = Tier::ALL.iter().map(|t| t.count()).collect();
        assert_eq!(counts, vec![1, 3, 4, 5]);
        assert_eq!(Tier::from_count(2), Some(Tier::X1));
        assert_eq!(Tier::from_count(0), None);
        assert_eq!(Tier::from_count(6), None);
    }

    #[test]
    fn test_symbol_def_json_shape() {
        let def: SymbolDef =
            serde_json::from_str(r#"{"name":"🍒","kind":"standard","value":4}"#).unwrap();
        assert_eq!(def, SymbolDef::standard("🍒", 4));
        let malus: SymbolDef = serde_json::from_str(r#"{"name":"💀","kind":"malus"}"#).unwrap();
        assert!(malus.is_malus());
        assert_eq!(malus.base_value(), None);
    }

    #[test]
    fn test_multiplier_next_saturates() {
        assert_eq!(Multiplier::X1.next(), Multiplier::X3);
        assert_eq!(Multiplier::X5.next(), Multiplier::X5);
        assert_eq!(Multiplier::X4.factor(), 4);
    }
}
