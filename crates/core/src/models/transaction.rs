use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// A single buy recorded in the portfolio ledger.
///
/// Persisted as plain JSON in the ledger collection. `quantity` and
/// `price_per_coin` are the only fields an edit may change; everything else
/// is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, assigned at creation and never reused.
    pub id: Uuid,

    /// Market data id of the asset (e.g., "bitcoin").
    pub crypto_id: String,

    /// Ticker symbol (e.g., "BTC").
    pub symbol: String,

    /// Units bought; always positive.
    pub quantity: f64,

    /// Cost per unit at purchase time; never negative.
    pub price_per_coin: f64,

    /// Instant the record was created (ISO-8601 in the stored JSON).
    pub date: DateTime<Utc>,
}

/// Input for a new transaction, validated at construction — the boundary
/// that constructs a `Transaction` enforces the invariants, the ledger
/// itself does not re-validate.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub crypto_id: String,
    pub symbol: String,
    pub quantity: f64,
    pub price_per_coin: f64,
}

impl TransactionDraft {
    /// Build a draft, enforcing `quantity > 0` and `price_per_coin >= 0`.
    pub fn new(
        crypto_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: f64,
        price_per_coin: f64,
    ) -> Result<Self, CoreError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        if !price_per_coin.is_finite() || price_per_coin < 0.0 {
            return Err(CoreError::Validation(format!(
                "price per coin must not be negative, got {price_per_coin}"
            )));
        }
        Ok(Self {
            crypto_id: crypto_id.into(),
            symbol: symbol.into(),
            quantity,
            price_per_coin,
        })
    }
}

/// Partial fields for an edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub quantity: Option<f64>,
    pub price_per_coin: Option<f64>,
}
