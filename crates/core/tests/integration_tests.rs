// ═══════════════════════════════════════════════════════════════════
// Integration Tests — CryptoTracker facade over one storage profile
// ═══════════════════════════════════════════════════════════════════

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crypto_tracker_core::errors::CoreError;
use crypto_tracker_core::models::transaction::{TransactionDraft, TransactionPatch};
use crypto_tracker_core::providers::transport::{HttpResponse, HttpTransport, TransportError};
use crypto_tracker_core::storage::backend::MemoryStore;
use crypto_tracker_core::{CryptoTracker, TrackerConfig};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════

struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(bodies: Vec<(u16, String)>) -> Arc<Self> {
        let responses = bodies
            .into_iter()
            .map(|(status, body)| HttpResponse { status, body })
            .collect();
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no scripted response left".into()))
    }
}

fn tracker_with(transport: Arc<ScriptedTransport>) -> CryptoTracker {
    CryptoTracker::with_transport(
        Arc::new(MemoryStore::new()),
        transport,
        TrackerConfig {
            base_url: "https://api.test/api/v3".into(),
            ..TrackerConfig::default()
        },
    )
    .unwrap()
}

fn markets_body(entries: &[(&str, f64)]) -> (u16, String) {
    let coins: Vec<_> = entries
        .iter()
        .map(|(id, price)| {
            json!({
                "id": id,
                "symbol": id,
                "name": id,
                "image": format!("https://img.test/{id}.png"),
                "current_price": price,
                "market_cap": 1.0e9,
                "price_change_percentage_24h": 1.0,
            })
        })
        .collect();
    (200, json!(coins).to_string())
}

fn draft(crypto_id: &str, quantity: f64, price: f64) -> TransactionDraft {
    TransactionDraft::new(crypto_id, crypto_id.to_uppercase(), quantity, price).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Ledger & Favorites Flow
// ═══════════════════════════════════════════════════════════════════

mod local_flow {
    use super::*;

    #[test]
    fn add_edit_delete_round_trip() {
        let mut tracker = CryptoTracker::in_memory();

        let tx = tracker
            .add_transaction(draft("bitcoin", 2.0, 20_000.0))
            .unwrap();
        assert_eq!(tracker.transactions().len(), 1);

        tracker
            .edit_transaction(
                tx.id,
                TransactionPatch {
                    quantity: Some(3.0),
                    price_per_coin: None,
                },
            )
            .unwrap();
        assert_eq!(tracker.transactions()[0].quantity, 3.0);

        assert!(!tracker.delete_transaction(tx.id, false).unwrap());
        assert_eq!(tracker.transactions().len(), 1);

        assert!(tracker.delete_transaction(tx.id, true).unwrap());
        assert!(tracker.transactions().is_empty());
    }

    #[test]
    fn favorites_toggle_and_query() {
        let mut tracker = CryptoTracker::in_memory();

        assert!(tracker.toggle_favorite("bitcoin").unwrap());
        assert!(tracker.toggle_favorite("solana").unwrap());
        assert!(tracker.is_favorite("bitcoin"));
        assert_eq!(tracker.favorites(), ["bitcoin", "solana"]);

        assert!(!tracker.toggle_favorite("bitcoin").unwrap());
        assert_eq!(tracker.favorites(), ["solana"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Disk Persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn a_reopened_profile_keeps_ledger_and_favorites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        {
            let mut tracker = CryptoTracker::open(&path).unwrap();
            tracker
                .add_transaction(draft("bitcoin", 2.0, 20_000.0))
                .unwrap();
            tracker.toggle_favorite("ethereum").unwrap();
        }

        let tracker = CryptoTracker::open(&path).unwrap();
        assert_eq!(tracker.transactions().len(), 1);
        assert_eq!(tracker.transactions()[0].crypto_id, "bitcoin");
        assert!(tracker.is_favorite("ethereum"));
    }

    #[test]
    fn a_corrupt_profile_opens_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "p@rtial g@rbage {{{").unwrap();

        let tracker = CryptoTracker::open(&path).unwrap();
        assert!(tracker.transactions().is_empty());
        assert!(tracker.favorites().is_empty());
    }

    #[test]
    fn a_missing_profile_opens_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = CryptoTracker::open(dir.path().join("new-profile.json")).unwrap();
        assert!(tracker.transactions().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Market Data & Valuation Flow
// ═══════════════════════════════════════════════════════════════════

mod market_flow {
    use super::*;

    #[tokio::test]
    async fn top_listings_flow_is_cached_per_page() {
        let transport = ScriptedTransport::new(vec![markets_body(&[("bitcoin", 50_000.0)])]);
        let tracker = tracker_with(transport.clone());

        let page = tracker.top_listings(1).await.unwrap();
        tracker.top_listings(1).await.unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn empty_watchlist_skips_the_network() {
        let transport = ScriptedTransport::new(vec![]);
        let tracker = tracker_with(transport.clone());

        let quotes = tracker.watchlist_quotes().await.unwrap();

        assert!(quotes.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn watchlist_quotes_cover_every_favorite() {
        let transport = ScriptedTransport::new(vec![markets_body(&[
            ("bitcoin", 50_000.0),
            ("ethereum", 3_000.0),
        ])]);
        let mut tracker = tracker_with(transport.clone());
        tracker.toggle_favorite("ethereum").unwrap();
        tracker.toggle_favorite("bitcoin").unwrap();

        let quotes = tracker.watchlist_quotes().await.unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn portfolio_valuation_joins_ledger_and_quotes() {
        let transport = ScriptedTransport::new(vec![markets_body(&[
            ("bitcoin", 120.0),
            ("airdrop", 50.0),
        ])]);
        let mut tracker = tracker_with(transport.clone());
        tracker.add_transaction(draft("bitcoin", 10.0, 100.0)).unwrap();
        tracker.add_transaction(draft("airdrop", 1.0, 0.0)).unwrap();

        let valuation = tracker.portfolio_valuation().await.unwrap();

        assert_eq!(valuation.rows.len(), 2);
        assert_eq!(valuation.total_initial_value, 1000.0);
        assert_eq!(valuation.total_current_value, 1250.0);
        assert_eq!(valuation.total_pnl, 250.0);
        assert_eq!(valuation.total_pnl_percent, 25.0);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn an_empty_ledger_values_to_the_default_without_network() {
        let transport = ScriptedTransport::new(vec![]);
        let tracker = tracker_with(transport.clone());

        let valuation = tracker.portfolio_valuation().await.unwrap();

        assert!(valuation.rows.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn valuation_surfaces_a_rate_limit_to_the_caller() {
        let transport = ScriptedTransport::new(vec![(429, String::new())]);
        let mut tracker = tracker_with(transport);
        tracker.add_transaction(draft("bitcoin", 1.0, 100.0)).unwrap();

        let err = tracker.portfolio_valuation().await.unwrap_err();
        assert!(matches!(err, CoreError::RateLimited));
    }

    #[tokio::test]
    async fn search_through_the_facade_enriches_results() {
        let transport = ScriptedTransport::new(vec![
            (200, json!({"coins": [{"id": "bitcoin"}]}).to_string()),
            markets_body(&[("bitcoin", 50_000.0)]),
        ]);
        let tracker = tracker_with(transport.clone());

        let results = tracker.search("bitcoin").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].current_price, Some(50_000.0));
        assert_eq!(transport.calls(), 2);
    }
}
