//! Paytable matrix
//!
//! Built once from the cabinet config. Rows run in reverse configured
//! symbol order; columns are the four tiers.

use serde::{Deserialize, Serialize};

use crate::config::{CabinetConfig, PaytableCell};
use crate::symbol::{SymbolKind, Tier};

/// One symbol row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaytableRow {
    pub symbol: String,
    /// Indexed by `Tier::index()`
    pub cells: [PaytableCell; 4],
}

/// Symbol × tier value grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paytable {
    rows: Vec<PaytableRow>,
}

impl Paytable {
    /// Build the matrix from config
    pub fn build(config: &CabinetConfig) -> Self {
        let rows = config
            .symbols
            .iter()
            .rev()
            .map(|symbol| PaytableRow {
                symbol: symbol.name.clone(),
                cells: Tier::ALL.map(|tier| Self::cell_for(config, &symbol.name, symbol.kind, tier)),
            })
            .collect();

        Self { rows }
    }

    fn cell_for(config: &CabinetConfig, name: &str, kind: SymbolKind, tier: Tier) -> PaytableCell {
        let count = tier.count();
        if let Some(cell) = config.combination_override(count, name) {
            return cell.clone();
        }

        match (kind, tier) {
            (SymbolKind::Malus, Tier::X1) => PaytableCell::Points(config.malus_value(1)),
            (SymbolKind::Malus, _) => PaytableCell::label(PaytableCell::FARKLE),
            (SymbolKind::Special, Tier::X1) => PaytableCell::label(PaytableCell::DASH),
            (SymbolKind::Special, _) => PaytableCell::label(PaytableCell::SPECIAL),
            (SymbolKind::Standard { value }, Tier::X1) => {
                if value > 0 {
                    PaytableCell::Points(value)
                } else {
                    PaytableCell::label(PaytableCell::DASH)
                }
            }
            (SymbolKind::Standard { value }, _) => {
                PaytableCell::Points(value * count as i64 + config.occurrence_points.bonus(count))
            }
        }
    }

    pub fn rows(&self) -> &[PaytableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display row of a symbol
    pub fn row_of(&self, symbol: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.symbol == symbol)
    }

    pub fn cell(&self, row: usize, tier: Tier) -> Option<&PaytableCell> {
        self.rows.get(row).map(|r| &r.cells[tier.index()])
    }

    /// Cell for a symbol at an occurrence count (a pair reads the x1 column)
    pub fn lookup(&self, symbol: &str, count: u8) -> Option<&PaytableCell> {
        let tier = Tier::from_count(count)?;
        self.cell(self.row_of(symbol)?, tier)
    }

    /// Points for a symbol at an occurrence count, zero for labels
    pub fn points(&self, symbol: &str, count: u8) -> i64 {
        self.lookup(symbol, count)
            .and_then(PaytableCell::points)
            .unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolDef;

    fn points(n: i64) -> PaytableCell {
        PaytableCell::Points(n)
    }

    #[test]
    fn test_rows_reverse_configured_order() {
        let table = Paytable::build(&CabinetConfig::default());
        let symbols: Vec<&str> = table.rows().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["🍋", "🍇", "🍊", "🍒", "💀", "7"]);
        assert_eq!(table.row_of("🍒"), Some(3));
    }

    #[test]
    fn test_standard_formula() {
        let table = Paytable::build(&CabinetConfig::default());
        let row = table.row_of("🍒").unwrap();
        // value 4; bonuses 10 / 20 / 50
        assert_eq!(table.cell(row, Tier::X1), Some(&points(4)));
        assert_eq!(table.cell(row, Tier::X3), Some(&points(4 * 3 + 10)));
        assert_eq!(table.cell(row, Tier::X4), Some(&points(4 * 4 + 20)));
        assert_eq!(table.cell(row, Tier::X5), Some(&points(4 * 5 + 50)));
    }

    #[test]
    fn test_malus_and_special_labels() {
        let table = Paytable::build(&CabinetConfig::default());
        let malus = &table.rows()[table.row_of("💀").unwrap()];
        assert_eq!(malus.cells[0], points(-10));
        for cell in &malus.cells[1..] {
            assert_eq!(cell, &PaytableCell::label("FARKLE"));
        }

        let special = &table.rows()[table.row_of("7").unwrap()];
        assert_eq!(special.cells[0], PaytableCell::label("-"));
        for cell in &special.cells[1..] {
            assert_eq!(cell, &PaytableCell::label("SPECIAL"));
        }
    }

    #[test]
    fn test_override_wins_everywhere() {
        let mut config = CabinetConfig::default();
        config.combination_points.insert("3🍒".into(), points(77));
        config.combination_points.insert("1💀".into(), PaytableCell::label("OUCH"));
        config.combination_points.insert("5🍋".into(), PaytableCell::label("MEGA"));
        let table = Paytable::build(&config);

        assert_eq!(table.lookup("🍒", 3), Some(&points(77)));
        assert_eq!(table.lookup("💀", 1), Some(&PaytableCell::label("OUCH")));
        assert_eq!(table.lookup("🍋", 5), Some(&PaytableCell::label("MEGA")));
        assert_eq!(table.points("🍋", 5), 0);
    }

    #[test]
    fn test_non_positive_base_is_dash() {
        let mut config = CabinetConfig::default();
        config.symbols.push(SymbolDef::standard("🥝", 0));
        let table = Paytable::build(&config);
        assert_eq!(table.lookup("🥝", 1), Some(&PaytableCell::label("-")));
        assert_eq!(table.lookup("🥝", 3), Some(&points(10)));
    }

    #[test]
    fn test_pair_reads_single_column() {
        let table = Paytable::build(&CabinetConfig::default());
        assert_eq!(table.points("🍊", 2), table.points("🍊", 1));
        assert_eq!(table.lookup("🍊", 0), None);
        assert_eq!(table.lookup("🥥", 3), None);
    }
}
