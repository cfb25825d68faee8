use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::fetcher::ResilientFetcher;
use crate::cache::TtlCache;
use crate::errors::CoreError;
use crate::models::market::{AssetDetail, MarketQuote, PriceHistory};

/// Public CoinGecko v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Listings page size used by the infinite-scroll feed.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Cap on how many search candidates are re-fetched with live quotes, to
/// keep the batch URL bounded.
const SEARCH_CANDIDATE_LIMIT: usize = 10;

/// Market data gateway: derives an endpoint and a cache key per logical
/// query and routes every call through cache → fetcher.
///
/// Two concurrent callers missing the same key will both reach the network;
/// in-flight request coalescing is deliberately absent at this scale.
pub struct CoinGeckoGateway {
    fetcher: ResilientFetcher,
    cache: TtlCache,
    base_url: String,
    vs_currency: String,
}

// ── /search response shape ──────────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: String,
}

impl CoinGeckoGateway {
    pub fn new(
        fetcher: ResilientFetcher,
        cache: TtlCache,
        base_url: impl Into<String>,
        vs_currency: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            base_url: base_url.into(),
            vs_currency: vs_currency.into(),
        }
    }

    /// Top listings by market cap. Cache key includes page and page size,
    /// so paged results are cached independently per page.
    pub async fn top_listings(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MarketQuote>, CoreError> {
        let url = self.url(
            "coins/markets",
            &[
                ("vs_currency", self.vs_currency.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", &per_page.to_string()),
                ("page", &page.to_string()),
                ("sparkline", "false"),
            ],
        )?;
        let key = format!("markets:page={page}:per={per_page}");
        self.api_call(&url, &key).await
    }

    /// Full single-asset record, including description and nested
    /// per-currency market data.
    pub async fn asset_detail(&self, id: &str) -> Result<AssetDetail, CoreError> {
        let url = self.url(&format!("coins/{id}"), &[])?;
        let key = format!("detail:{id}");
        self.api_call(&url, &key).await
    }

    /// Historical price series over the given day window. Cache key includes
    /// the window.
    pub async fn price_history(&self, id: &str, days: u32) -> Result<PriceHistory, CoreError> {
        let url = self.url(
            &format!("coins/{id}/market_chart"),
            &[
                ("vs_currency", self.vs_currency.as_str()),
                ("days", &days.to_string()),
            ],
        )?;
        let key = format!("chart:{id}:{days}");
        self.api_call(&url, &key).await
    }

    /// Batch quote lookup. An empty input short-circuits to an empty result
    /// without touching cache or network. Ids are sorted (and deduplicated)
    /// first so equivalent id sets share one cache entry.
    pub async fn quotes_by_ids(&self, ids: &[String]) -> Result<Vec<MarketQuote>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        let joined = sorted.join(",");

        let url = self.url(
            "coins/markets",
            &[
                ("vs_currency", self.vs_currency.as_str()),
                ("ids", &joined),
            ],
        )?;
        let key = format!("markets:ids={joined}");
        self.api_call(&url, &key).await
    }

    /// Two-step text search: resolve the query to candidate ids via the
    /// name/symbol search index, then re-enter [`Self::quotes_by_ids`] so the
    /// result carries live price data rather than the thin search payload.
    pub async fn search(&self, query: &str) -> Result<Vec<MarketQuote>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("search", &[("query", query)])?;
        let key = format!("search:{query}");
        let resolved: SearchResponse = self.api_call(&url, &key).await?;

        let ids: Vec<String> = resolved
            .coins
            .into_iter()
            .take(SEARCH_CANDIDATE_LIMIT)
            .map(|hit| hit.id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.quotes_by_ids(&ids).await
    }

    /// Single internal primitive: cache lookup, then fetch + deserialize +
    /// store on a miss. The cache keeps the raw payload, so one entry can be
    /// re-read into any compatible shape.
    async fn api_call<T: DeserializeOwned>(
        &self,
        url: &str,
        cache_key: &str,
    ) -> Result<T, CoreError> {
        if let Some(value) = self.cache.get(cache_key) {
            tracing::debug!(cache_key, "cache hit");
            return serde_json::from_value(value)
                .map_err(|e| CoreError::Api(format!("cached payload no longer parses: {e}")));
        }

        let body = self.fetcher.request(url).await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| CoreError::Api(format!("malformed payload: {e}")))?;
        let parsed: T = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Api(format!("unexpected payload shape: {e}")))?;

        self.cache.set(cache_key, value)?;
        Ok(parsed)
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<String, CoreError> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url.trim_end_matches('/')))
            .map_err(|e| CoreError::Api(format!("invalid endpoint URL: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url.to_string())
    }
}
