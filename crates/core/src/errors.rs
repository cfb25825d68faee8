use thiserror::Error;

/// Unified error type for the entire crypto-tracker-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// Callers branch on the variant, not on a type hierarchy: `RateLimited` is
/// the "please wait" condition, everything else degrades to an error state
/// that a new user action or timer can recover from.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    /// HTTP 429 from the upstream API, or a low-level connectivity fault.
    /// Never retried — the upstream will keep rejecting within the same
    /// window.
    #[error("Rate limited by the market data API — please wait before retrying")]
    RateLimited,

    /// A non-success HTTP status other than 429, surfaced once retries
    /// are exhausted.
    #[error("API request failed with HTTP status {status}")]
    Http { status: u16 },

    /// The call itself failed for a reason other than connectivity
    /// (interrupted body stream, protocol fault, ...). Retried up to the
    /// bound before being surfaced.
    #[error("Network error: {0}")]
    Network(String),

    /// A successful response carried a malformed or error-flagged payload.
    #[error("API error: {0}")]
    Api(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Storage read failed: {0}")]
    PersistenceRead(String),

    #[error("Storage write failed: {0}")]
    PersistenceWrite(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Transaction validation failed: {0}")]
    Validation(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}
