use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::market::MarketQuote;
use crate::models::transaction::Transaction;
use crate::models::valuation::{PortfolioValuation, ValuationRow};
use crate::providers::coingecko::CoinGeckoGateway;

/// Joins ledger records with live quotes to produce per-position and
/// aggregate profit/loss.
///
/// Quotes come from one batched call over the distinct ids referenced by the
/// transactions — never one call per transaction — to respect the upstream
/// rate limit. A failed batch call propagates to the caller; the engine
/// never silently renders stale or zeroed figures.
pub struct ValuationEngine {
    gateway: Arc<CoinGeckoGateway>,
}

impl ValuationEngine {
    pub fn new(gateway: Arc<CoinGeckoGateway>) -> Self {
        Self { gateway }
    }

    /// Value the given transactions against live quotes.
    pub async fn value(
        &self,
        transactions: &[Transaction],
    ) -> Result<PortfolioValuation, CoreError> {
        if transactions.is_empty() {
            return Ok(PortfolioValuation::default());
        }

        let mut seen = HashSet::new();
        let ids: Vec<String> = transactions
            .iter()
            .filter(|t| seen.insert(t.crypto_id.as_str()))
            .map(|t| t.crypto_id.clone())
            .collect();

        let quotes = self.gateway.quotes_by_ids(&ids).await?;
        let by_id: HashMap<&str, &MarketQuote> =
            quotes.iter().map(|q| (q.id.as_str(), q)).collect();

        Ok(value_positions(transactions, &by_id))
    }
}

/// Pure valuation over an already-fetched quote map. No I/O.
///
/// Per position: `current_value = quantity × current price` (0 when the
/// quote is missing), `pnl = current_value − initial_value`, and the percent
/// guards a zero cost basis. The aggregate percent applies the same guard.
pub fn value_positions(
    transactions: &[Transaction],
    quotes: &HashMap<&str, &MarketQuote>,
) -> PortfolioValuation {
    let mut rows = Vec::with_capacity(transactions.len());
    let mut total_initial_value = 0.0;
    let mut total_current_value = 0.0;

    for transaction in transactions {
        let quote = quotes.get(transaction.crypto_id.as_str());
        let current_price = quote.map(|q| q.price_or_zero()).unwrap_or(0.0);
        let image = quote.and_then(|q| q.image.clone()).unwrap_or_default();

        let current_value = transaction.quantity * current_price;
        let initial_value = transaction.quantity * transaction.price_per_coin;
        let pnl = current_value - initial_value;
        let pnl_percent = if initial_value == 0.0 {
            0.0
        } else {
            pnl / initial_value * 100.0
        };

        total_initial_value += initial_value;
        total_current_value += current_value;

        rows.push(ValuationRow {
            transaction: transaction.clone(),
            image,
            current_value,
            initial_value,
            pnl,
            pnl_percent,
        });
    }

    let total_pnl = total_current_value - total_initial_value;
    let total_pnl_percent = if total_initial_value == 0.0 {
        0.0
    } else {
        total_pnl / total_initial_value * 100.0
    };

    PortfolioValuation {
        rows,
        total_initial_value,
        total_current_value,
        total_pnl,
        total_pnl_percent,
    }
}
