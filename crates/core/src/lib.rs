pub mod cache;
pub mod converter;
pub mod errors;
pub mod favorites;
pub mod ledger;
pub mod models;
pub mod providers;
pub mod search;
pub mod storage;
pub mod valuation;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use cache::{TtlCache, DEFAULT_TTL};
use errors::CoreError;
use favorites::FavoriteSet;
use ledger::TransactionLedger;
use models::market::{AssetDetail, MarketQuote, PriceHistory};
use models::transaction::{Transaction, TransactionDraft, TransactionPatch};
use models::valuation::PortfolioValuation;
use providers::coingecko::{CoinGeckoGateway, DEFAULT_BASE_URL, DEFAULT_PER_PAGE};
use providers::fetcher::{ResilientFetcher, RetryPolicy};
use providers::transport::{HttpTransport, ReqwestTransport};
use search::SearchDebouncer;
use storage::backend::{MemoryStore, StorageBackend};
use storage::file::FileStore;
use valuation::ValuationEngine;

/// Tunables for the tracker. Defaults target the public CoinGecko API.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub base_url: String,

    /// Quote currency for every market data call (lowercase, e.g., "usd").
    pub vs_currency: String,

    /// Time-to-live for cached API payloads.
    pub cache_ttl: Duration,

    /// Retry behavior of the resilient fetcher.
    pub retry: RetryPolicy,

    /// Quiet period before a queued text search actually runs.
    pub search_debounce: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            vs_currency: "usd".to_string(),
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
            search_debounce: Duration::from_millis(300),
        }
    }
}

/// Main entry point for the Crypto Tracker core library.
///
/// Ties the market data gateway, the transaction ledger, the favorites set
/// and the valuation engine to one storage profile. Market data flows
/// through the gateway's TTL cache; ledger and favorites mutations write
/// through to the same storage backend under their own keys. The gateway
/// never calls the ledger; the ledger never calls the network.
#[must_use]
pub struct CryptoTracker {
    gateway: Arc<CoinGeckoGateway>,
    valuation: ValuationEngine,
    ledger: TransactionLedger,
    favorites: FavoriteSet,
    config: TrackerConfig,
}

impl std::fmt::Debug for CryptoTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoTracker")
            .field("transactions", &self.ledger.len())
            .field("favorites", &self.favorites.len())
            .field("vs_currency", &self.config.vs_currency)
            .finish()
    }
}

impl CryptoTracker {
    /// Ephemeral tracker with nothing persisted (scratch profile).
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), TrackerConfig::default())
            .expect("memory-backed load cannot fail")
    }

    /// Open (or create) a tracker persisted to a JSON document on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let store: Arc<dyn StorageBackend> = Arc::new(FileStore::open(path)?);
        Self::with_store(store, TrackerConfig::default())
    }

    /// Build on an arbitrary storage backend with the given configuration.
    pub fn with_store(
        store: Arc<dyn StorageBackend>,
        config: TrackerConfig,
    ) -> Result<Self, CoreError> {
        Self::with_transport(store, Arc::new(ReqwestTransport::new()), config)
    }

    /// Build with a custom HTTP transport — the seam tests use to avoid the
    /// live API.
    pub fn with_transport(
        store: Arc<dyn StorageBackend>,
        transport: Arc<dyn HttpTransport>,
        config: TrackerConfig,
    ) -> Result<Self, CoreError> {
        let fetcher = ResilientFetcher::new(transport, config.retry);
        let cache = TtlCache::new(Arc::clone(&store), config.cache_ttl);
        let gateway = Arc::new(CoinGeckoGateway::new(
            fetcher,
            cache,
            config.base_url.clone(),
            config.vs_currency.clone(),
        ));
        let valuation = ValuationEngine::new(Arc::clone(&gateway));
        let ledger = TransactionLedger::load(Arc::clone(&store))?;
        let favorites = FavoriteSet::load(store)?;

        Ok(Self {
            gateway,
            valuation,
            ledger,
            favorites,
            config,
        })
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// One page of the top listings feed, 20 assets per page.
    pub async fn top_listings(&self, page: u32) -> Result<Vec<MarketQuote>, CoreError> {
        self.gateway.top_listings(page, DEFAULT_PER_PAGE).await
    }

    /// Top listings with an explicit page size.
    pub async fn top_listings_with_page_size(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MarketQuote>, CoreError> {
        self.gateway.top_listings(page, per_page).await
    }

    /// Full record for one asset.
    pub async fn asset_detail(&self, id: &str) -> Result<AssetDetail, CoreError> {
        self.gateway.asset_detail(id).await
    }

    /// Historical price series for one asset over a day window.
    pub async fn price_history(&self, id: &str, days: u32) -> Result<PriceHistory, CoreError> {
        self.gateway.price_history(id, days).await
    }

    /// Quote-enriched text search (resolve candidates, then batch-quote).
    pub async fn search(&self, query: &str) -> Result<Vec<MarketQuote>, CoreError> {
        self.gateway.search(query).await
    }

    /// Debounced search runner over this tracker's gateway.
    pub fn search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(Arc::clone(&self.gateway), self.config.search_debounce)
    }

    /// The underlying gateway, for collaborators that need direct access.
    pub fn gateway(&self) -> Arc<CoinGeckoGateway> {
        Arc::clone(&self.gateway)
    }

    // ── Ledger ──────────────────────────────────────────────────────

    /// Record a new buy transaction.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, CoreError> {
        self.ledger.add(draft)
    }

    /// Change the quantity and/or price of an existing transaction.
    pub fn edit_transaction(
        &mut self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<(), CoreError> {
        self.ledger.edit(id, patch)
    }

    /// Delete a transaction. `confirmed` is the external confirmation gate;
    /// without it the ledger is left untouched and `false` is returned.
    pub fn delete_transaction(&mut self, id: Uuid, confirmed: bool) -> Result<bool, CoreError> {
        self.ledger.delete(id, confirmed)
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    // ── Favorites ───────────────────────────────────────────────────

    /// Add or remove an asset from the watchlist. Returns `true` when the
    /// asset is a favorite after the call.
    pub fn toggle_favorite(&mut self, crypto_id: &str) -> Result<bool, CoreError> {
        self.favorites.toggle(crypto_id)
    }

    #[must_use]
    pub fn is_favorite(&self, crypto_id: &str) -> bool {
        self.favorites.contains(crypto_id)
    }

    #[must_use]
    pub fn favorites(&self) -> &[String] {
        self.favorites.ids()
    }

    /// Live quotes for the whole watchlist; an empty watchlist skips the
    /// network entirely.
    pub async fn watchlist_quotes(&self) -> Result<Vec<MarketQuote>, CoreError> {
        self.gateway.quotes_by_ids(self.favorites.ids()).await
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value the whole ledger against live quotes (one batched call over the
    /// distinct asset ids).
    pub async fn portfolio_valuation(&self) -> Result<PortfolioValuation, CoreError> {
        self.valuation.value(self.ledger.transactions()).await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
