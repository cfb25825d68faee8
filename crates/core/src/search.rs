use std::sync::Arc;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};

use crate::errors::CoreError;
use crate::models::market::MarketQuote;
use crate::providers::coingecko::CoinGeckoGateway;

/// Runs text searches after a quiet period, cancelling the pending one when
/// a new keystroke arrives. The debounce timer is the only construct in the
/// core that cancels work.
pub struct SearchDebouncer {
    gateway: Arc<CoinGeckoGateway>,
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl SearchDebouncer {
    pub fn new(gateway: Arc<CoinGeckoGateway>, delay: Duration) -> Self {
        Self {
            gateway,
            delay,
            pending: None,
        }
    }

    /// Schedule a search for `query`, aborting any search still pending.
    /// The returned handle yields the gateway result; awaiting a superseded
    /// handle reports cancellation instead.
    pub fn submit(
        &mut self,
        query: impl Into<String>,
    ) -> JoinHandle<Result<Vec<MarketQuote>, CoreError>> {
        if let Some(stale) = self.pending.take() {
            stale.abort();
        }

        let gateway = Arc::clone(&self.gateway);
        let delay = self.delay;
        let query = query.into();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            gateway.search(&query).await
        });
        self.pending = Some(handle.abort_handle());
        handle
    }

    /// Drop any pending search without running it.
    pub fn cancel(&mut self) {
        if let Some(stale) = self.pending.take() {
            stale.abort();
        }
    }
}
