use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// One transaction joined with its live quote. Derived and ephemeral:
/// recomputed whenever the quote set or the ledger changes, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRow {
    pub transaction: Transaction,

    /// Quote image URL, empty when the quote is missing.
    pub image: String,

    /// quantity × current price (0 when the quote is missing).
    pub current_value: f64,

    /// quantity × price per coin — the cost basis of the position.
    pub initial_value: f64,

    pub pnl: f64,

    /// Profit/loss relative to cost basis, in percent; 0 when the basis is 0.
    pub pnl_percent: f64,
}

/// Valuation of the full ledger: per-position rows plus aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub rows: Vec<ValuationRow>,
    pub total_initial_value: f64,
    pub total_current_value: f64,
    pub total_pnl: f64,

    /// Aggregate profit/loss percent; 0 when nothing was invested, the same
    /// guard the per-row figure applies.
    pub total_pnl_percent: f64,
}
