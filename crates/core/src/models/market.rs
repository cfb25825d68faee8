use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live market snapshot for one asset, as returned by `/coins/markets`.
///
/// Read-only and externally sourced; never persisted beyond the TTL cache.
/// The upstream reports `null` for prices of thinly traded or delisted
/// assets, hence the `Option` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketQuote {
    /// Current price, or 0.0 while the upstream reports none.
    pub fn price_or_zero(&self) -> f64 {
        self.current_price.unwrap_or(0.0)
    }
}

/// Full single-asset record from `/coins/{id}`: description, images and the
/// nested per-currency market data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub image: ImageSet,
    #[serde(default)]
    pub market_data: MarketData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub en: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Per-currency market figures, keyed by lowercase quote currency ("usd").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl AssetDetail {
    /// Current price in the given quote currency (e.g., "usd").
    pub fn current_price(&self, vs_currency: &str) -> Option<f64> {
        self.market_data.current_price.get(vs_currency).copied()
    }

    /// Market capitalization in the given quote currency.
    pub fn market_cap(&self, vs_currency: &str) -> Option<f64> {
        self.market_data.market_cap.get(vs_currency).copied()
    }

    /// First sentence of the English description, if there is one.
    pub fn description_summary(&self) -> Option<&str> {
        let en = self.description.en.as_deref()?;
        if en.is_empty() {
            return None;
        }
        Some(en.split(". ").next().unwrap_or(en))
    }
}

/// Historical price series from `/coins/{id}/market_chart`.
///
/// `prices` is the raw `[timestamp in ms, price]` series; the upstream also
/// sends market caps and volumes, which are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

impl PriceHistory {
    /// The series as timestamped points, skipping entries whose timestamp
    /// cannot be represented.
    pub fn points(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.prices
            .iter()
            .filter_map(|&(ts_ms, price)| {
                DateTime::from_timestamp_millis(ts_ms as i64).map(|dt| (dt, price))
            })
            .collect()
    }
}
