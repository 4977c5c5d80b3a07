//! Spin evaluation
//!
//! Turns the five wheel symbols into a score: occurrence counts, the
//! farkle and jackpot checks, bonus tokens for specials and paytable
//! points for everything else.

use af_core::{CabinetConfig, Paytable, SymbolKind, WHEEL_COUNT};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Malus occurrences that wipe the rolling points
pub const FARKLE_COUNT: u8 = 3;
/// Occurrences of one standard symbol that make a jackpot
pub const JACKPOT_COUNT: u8 = 5;
/// Occurrences that count as a combination
pub const COMBINATION_COUNT: u8 = 3;

/// One symbol and how often it shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: u8,
}

impl SymbolCount {
    /// Highlight value for `update-combi` ("x2" for a pair)
    pub fn highlight(&self) -> String {
        format!("x{}", self.count)
    }
}

/// Evaluated spin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Counts in order of first appearance on the wheels
    pub counts: Vec<SymbolCount>,
    pub farkle: bool,
    /// Symbol of a five-of-a-kind
    pub jackpot: Option<String>,
    pub bonus_tokens: u32,
    /// Points before the multiplier (negative for malus)
    pub points: i64,
    /// Wheels that are part of a combination
    pub combination_wheels: [bool; WHEEL_COUNT],
}

impl SpinOutcome {
    pub fn count_of(&self, symbol: &str) -> u8 {
        self.counts
            .iter()
            .find(|c| c.symbol == symbol)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Evaluate five wheel positions against the configured symbols
pub fn evaluate(
    config: &CabinetConfig,
    paytable: &Paytable,
    wheels: &[usize; WHEEL_COUNT],
) -> GameResult<SpinOutcome> {
    let mut counts: Vec<SymbolCount> = Vec::with_capacity(WHEEL_COUNT);
    for (wheel, &index) in wheels.iter().enumerate() {
        let symbol = config
            .symbols
            .get(index)
            .ok_or(GameError::UnknownSymbol {
                wheel,
                symbol: index,
                available: config.symbols.len(),
            })?;
        match counts.iter_mut().find(|c| c.symbol == symbol.name) {
            Some(entry) => entry.count += 1,
            None => counts.push(SymbolCount {
                symbol: symbol.name.clone(),
                count: 1,
            }),
        }
    }

    let mut outcome = SpinOutcome {
        counts,
        ..Default::default()
    };

    let malus = config
        .symbols
        .iter()
        .filter(|s| s.is_malus())
        .map(|s| outcome.count_of(&s.name))
        .sum::<u8>();
    if malus >= FARKLE_COUNT {
        outcome.farkle = true;
        return Ok(outcome);
    }

    for entry in &outcome.counts {
        let Some(def) = config.symbol(&entry.symbol) else {
            continue;
        };
        let combination = match def.kind {
            SymbolKind::Standard { .. } => {
                outcome.points += paytable.points(&entry.symbol, entry.count);
                if entry.count >= JACKPOT_COUNT {
                    outcome.jackpot = Some(entry.symbol.clone());
                }
                entry.count >= COMBINATION_COUNT
            }
            SymbolKind::Malus => {
                outcome.points += config.malus_value(entry.count);
                false
            }
            SymbolKind::Special => {
                if entry.count >= COMBINATION_COUNT {
                    outcome.bonus_tokens +=
                        entry.count as u32 * config.rules.special_tokens_per_symbol;
                    true
                } else {
                    false
                }
            }
        };

        if combination {
            for (wheel, &index) in wheels.iter().enumerate() {
                if config.symbols[index].name == entry.symbol {
                    outcome.combination_wheels[wheel] = true;
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(wheels: [usize; WHEEL_COUNT]) -> SpinOutcome {
        let config = CabinetConfig::default();
        let paytable = Paytable::build(&config);
        evaluate(&config, &paytable, &wheels).unwrap()
    }

    #[test]
    fn test_three_skulls_farkle() {
        let outcome = spin([1, 1, 1, 2, 3]);
        assert!(outcome.farkle);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.count_of("💀"), 3);
    }

    #[test]
    fn test_five_lemons_jackpot() {
        let outcome = spin([5, 5, 5, 5, 5]);
        assert_eq!(outcome.jackpot.as_deref(), Some("🍋"));
        assert_eq!(outcome.points, 5 + 50);
        assert_eq!(outcome.combination_wheels, [true; WHEEL_COUNT]);
    }

    #[test]
    fn test_four_oranges() {
        let outcome = spin([3, 3, 3, 3, 5]);
        assert_eq!(outcome.jackpot, None);
        assert_eq!(outcome.points, 3 * 4 + 20 + 1);
        assert_eq!(outcome.combination_wheels, [true, true, true, true, false]);
        assert_eq!(outcome.counts[1].highlight(), "x1");
    }

    #[test]
    fn test_triple_seven_gives_tokens() {
        let outcome = spin([2, 0, 0, 0, 3]);
        assert_eq!(outcome.bonus_tokens, 3);
        assert_eq!(outcome.points, 4 + 3);
        assert_eq!(outcome.counts[1].highlight(), "x3");
    }

    #[test]
    fn test_skull_pair_costs_points() {
        let outcome = spin([1, 1, 2, 3, 4]);
        assert!(!outcome.farkle);
        assert_eq!(outcome.points, -25 + 4 + 3 + 2);
        assert_eq!(outcome.counts[0].highlight(), "x2");
    }

    #[test]
    fn test_out_of_range_symbol() {
        let config = CabinetConfig::default();
        let paytable = Paytable::build(&config);
        let err = evaluate(&config, &paytable, &[0, 0, 9, 0, 0]).unwrap_err();
        assert!(matches!(err, GameError::UnknownSymbol { wheel: 2, symbol: 9, .. }));
    }
}
