//! Cabinet configuration
//!
//! One JSON document describes the symbol set, the scoring constants,
//! the timing windows and the game rules. `CabinetConfig::default()`
//! is the installation's stock setup.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::symbol::SymbolDef;

/// Flat bonus added per occurrence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrencePoints {
    pub triple: i64,
    pub quadruple: i64,
    pub quintuple: i64,
}

impl OccurrencePoints {
    /// Bonus for a count, zero outside 3..=5
    pub fn bonus(&self, count: u8) -> i64 {
        match count {
            3 => self.triple,
            4 => self.quadruple,
            5 => self.quintuple,
            _ => 0,
        }
    }
}

impl Default for OccurrencePoints {
    fn default() -> Self {
        Self {
            triple: 10,
            quadruple: 20,
            quintuple: 50,
        }
    }
}

/// Paytable cell content: a number or a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaytableCell {
    Points(i64),
    Label(String),
}

impl PaytableCell {
    pub const DASH: &'static str = "-";
    pub const FARKLE: &'static str = "FARKLE";
    pub const SPECIAL: &'static str = "SPECIAL";

    pub fn label(text: &str) -> Self {
        PaytableCell::Label(text.to_string())
    }

    /// Numeric value, if any
    pub fn points(&self) -> Option<i64> {
        match self {
            PaytableCell::Points(p) => Some(*p),
            PaytableCell::Label(_) => None,
        }
    }
}

impl fmt::Display for PaytableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaytableCell::Points(p) => write!(f, "{p}"),
            PaytableCell::Label(s) => f.write_str(s),
        }
    }
}

/// Timing windows, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed step rate of the cabinet loop
    pub frame_rate: u32,
    /// Farkle alert duration before the palette reverts
    pub farkle_secs: f32,
    /// Jackpot flash duration before `jackpot-end`
    pub jackpot_secs: f32,
    /// Shooter round length
    pub shooter_secs: f32,
    /// Delay between a message and the action it announces
    pub message_delay_secs: f32,
    /// Delay before the intro is skipped
    pub skip_intro_delay_secs: f32,
    /// Delay before a second-chance respawn
    pub respawn_delay_secs: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            farkle_secs: 3.0,
            jackpot_secs: 3.0,
            shooter_secs: 15.0,
            message_delay_secs: 1.5,
            skip_intro_delay_secs: 2.0,
            respawn_delay_secs: 3.0,
        }
    }
}

/// Game rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_tokens: u32,
    pub starting_quota: i64,
    /// Quota increase after each shooter round and on respawn
    pub quota_step: i64,
    pub respawn_tokens: u32,
    /// Allow one respawn before the final loss
    pub second_chance: bool,
    /// Spin tokens granted per special symbol in a 3+ special combination
    pub special_tokens_per_symbol: u32,
    /// Spin tokens granted per shooter target hit
    pub tokens_per_hit: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_tokens: 10,
            starting_quota: 200,
            quota_step: 400,
            respawn_tokens: 3,
            second_chance: true,
            special_tokens_per_symbol: 1,
            tokens_per_hit: 1,
        }
    }
}

/// Complete cabinet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetConfig {
    /// Symbol set, in configured order
    pub symbols: Vec<SymbolDef>,
    pub occurrence_points: OccurrencePoints,
    /// Malus value by occurrence count
    pub malus_points: BTreeMap<u8, i64>,
    /// Explicit cell values keyed `"<count><symbol>"`, e.g. `"3🍒"`
    pub combination_points: BTreeMap<String, PaytableCell>,
    pub timing: TimingConfig,
    pub rules: RulesConfig,
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                SymbolDef::special("7"),
                SymbolDef::malus("💀"),
                SymbolDef::standard("🍒", 4),
                SymbolDef::standard("🍊", 3),
                SymbolDef::standard("🍇", 2),
                SymbolDef::standard("🍋", 1),
            ],
            occurrence_points: OccurrencePoints::default(),
            malus_points: BTreeMap::from([(1, -10), (2, -25)]),
            combination_points: BTreeMap::new(),
            timing: TimingConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl CabinetConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!(
            "[Config] Loaded {} ({} symbols)",
            path.display(),
            config.symbols.len()
        );
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: CabinetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configs the paytable and game logic cannot run with
    pub fn validate(&self) -> CoreResult<()> {
        if self.symbols.is_empty() {
            return Err(CoreError::Config("symbol set is empty".into()));
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.name.is_empty() {
                return Err(CoreError::Config("symbol with empty name".into()));
            }
            if !seen.insert(symbol.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "duplicate symbol '{}'",
                    symbol.name
                )));
            }
        }

        if self.timing.frame_rate == 0 {
            return Err(CoreError::Config("frame_rate must be positive".into()));
        }

        let windows = [
            ("farkle_secs", self.timing.farkle_secs),
            ("jackpot_secs", self.timing.jackpot_secs),
            ("shooter_secs", self.timing.shooter_secs),
            ("message_delay_secs", self.timing.message_delay_secs),
            ("skip_intro_delay_secs", self.timing.skip_intro_delay_secs),
            ("respawn_delay_secs", self.timing.respawn_delay_secs),
        ];
        for (name, secs) in windows {
            if !secs.is_finite() || secs < 0.0 {
                return Err(CoreError::Config(format!("{name} must be >= 0, got {secs}")));
            }
        }

        Ok(())
    }

    /// Index of a symbol in configured order
    pub fn symbol_index(&self, name: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s.name == name)
    }

    pub fn symbol(&self, name: &str) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Override for `(count, symbol)`, if configured
    pub fn combination_override(&self, count: u8, symbol: &str) -> Option<&PaytableCell> {
        self.combination_points.get(&format!("{count}{symbol}"))
    }

    /// Malus value for a count; falls back to the single value times count
    pub fn malus_value(&self, count: u8) -> i64 {
        match self.malus_points.get(&count) {
            Some(v) => *v,
            None => self.malus_points.get(&1).copied().unwrap_or(0) * count as i64,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
