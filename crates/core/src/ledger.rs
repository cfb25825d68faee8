use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::{Transaction, TransactionDraft, TransactionPatch};
use crate::storage::backend::StorageBackend;

/// Storage key for the serialized transaction collection.
pub const LEDGER_KEY: &str = "cryptoPortfolio";

/// CRUD over locally persisted transactions.
///
/// The in-memory collection is the single source of truth during a session;
/// every mutation re-serializes the whole collection to the storage backend.
/// The ledger never touches the network.
pub struct TransactionLedger {
    store: Arc<dyn StorageBackend>,
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    /// Load the persisted collection. Unreadable stored JSON is logged and
    /// treated as an empty ledger rather than a fatal error.
    pub fn load(store: Arc<dyn StorageBackend>) -> Result<Self, CoreError> {
        let transactions = match store.read(LEDGER_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "stored ledger is unreadable — starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self {
            store,
            transactions,
        })
    }

    /// Record a new transaction: stamps a fresh id and the current instant,
    /// appends, persists.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, CoreError> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            crypto_id: draft.crypto_id,
            symbol: draft.symbol,
            quantity: draft.quantity,
            price_per_coin: draft.price_per_coin,
            date: Utc::now(),
        };
        self.transactions.push(transaction.clone());
        self.persist()?;
        tracing::info!(id = %transaction.id, symbol = %transaction.symbol, "transaction added");
        Ok(transaction)
    }

    /// Merge the patch into the record matching `id`; every other record and
    /// field is left untouched.
    pub fn edit(&mut self, id: Uuid, patch: TransactionPatch) -> Result<(), CoreError> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        if let Some(quantity) = patch.quantity {
            transaction.quantity = quantity;
        }
        if let Some(price_per_coin) = patch.price_per_coin {
            transaction.price_per_coin = price_per_coin;
        }
        self.persist()?;
        tracing::info!(%id, "transaction updated");
        Ok(())
    }

    /// Remove the record matching `id`, gated on an external confirmation
    /// signal. Returns `false` — collection untouched — when the caller did
    /// not confirm.
    pub fn delete(&mut self, id: Uuid, confirmed: bool) -> Result<bool, CoreError> {
        if !confirmed {
            return Ok(false);
        }

        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        self.transactions.remove(idx);
        self.persist()?;
        tracing::warn!(%id, "transaction deleted");
        Ok(true)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Distinct market data ids referenced by the ledger, in first-seen
    /// order. This is what the valuation engine batches its quote call over.
    pub fn distinct_crypto_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .filter(|t| seen.insert(t.crypto_id.as_str()))
            .map(|t| t.crypto_id.clone())
            .collect()
    }

    fn persist(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.transactions)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.store.write(LEDGER_KEY, &raw)
    }
}
