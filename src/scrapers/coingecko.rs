//! CoinGecko API Integration
//! Mission: Market-cap listing and aggregated exchange tickers in one place
//!
//! Two endpoints matter here: `/coins/markets` drives the CoinLister, and
//! `/coins/{id}/tickers` gives us one aggregated shot at filling venue slots
//! before we fall back to direct exchange calls.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScanError;
use crate::models::{Coin, PriceQuote};
use crate::transport::FetchOrchestrator;

const API_BASE: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoClient {
    http: Arc<FetchOrchestrator>,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: Arc<FetchOrchestrator>) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
        }
    }

    /// Fetch the top-market-cap page and keep coins updated within
    /// `max_age_days` (0 = keep everything). An empty result is valid and
    /// reported as `NoData` by the caller, not retried here.
    pub async fn list_recent_coins(
        &self,
        max_age_days: u32,
        page_size: usize,
    ) -> Result<Vec<Coin>, ScanError> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, page_size
        );

        let markets: Vec<MarketEntry> = self.http.fetch_json(&url).await?;
        debug!(fetched = markets.len(), "coin market list received");

        let cutoff = Utc::now() - Duration::days(i64::from(max_age_days));
        let coins: Vec<Coin> = markets
            .into_iter()
            .filter(|m| {
                if max_age_days == 0 {
                    return true;
                }
                // Missing timestamp counts as stale when the age filter is on
                m.last_updated.map(|ts| ts >= cutoff).unwrap_or(false)
            })
            .take(page_size)
            .map(|m| Coin {
                id: m.id,
                symbol: m.symbol.to_uppercase(),
                name: m.name,
                market_cap: m.market_cap.unwrap_or(0.0),
                last_updated: m.last_updated,
            })
            .collect();

        info!(coins = coins.len(), max_age_days, "coin list ready");
        Ok(coins)
    }

    /// Fetch the aggregated tickers for one coin. A failed or unparseable
    /// call degrades to an empty list — venue slots then fall back to direct
    /// exchange requests.
    pub async fn fetch_tickers(&self, coin_id: &str) -> Vec<TickerEntry> {
        let url = format!("{}/coins/{}/tickers", self.base_url, coin_id);

        match self.http.fetch_json::<TickersResponse>(&url).await {
            Ok(resp) => resp.tickers,
            Err(e) => {
                debug!(coin_id, error = %e, "aggregated tickers unavailable");
                Vec::new()
            }
        }
    }
}

/// Find the first ticker whose market identifier matches one of the given
/// venue identifiers (case-insensitive exact match) and turn it into a quote.
/// Prefers the USD-converted price/volume, falling back to the raw fields.
pub fn quote_for_venue(tickers: &[TickerEntry], identifiers: &[&str]) -> Option<PriceQuote> {
    tickers
        .iter()
        .find(|t| {
            identifiers
                .iter()
                .any(|id| t.market.identifier.eq_ignore_ascii_case(id))
        })
        .and_then(|t| {
            let price = t
                .converted_last
                .as_ref()
                .and_then(|c| c.usd)
                .or(t.last)?;
            let volume = t
                .converted_volume
                .as_ref()
                .and_then(|c| c.usd)
                .or(t.volume);
            PriceQuote::checked(format!("{}_{}", t.base, t.target), price, volume)
        })
}

// ---- wire types (field names match the real API) ----

#[derive(Debug, Clone, Deserialize)]
struct MarketEntry {
    id: String,
    symbol: String,
    name: String,
    market_cap: Option<f64>,
    last_updated: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TickersResponse {
    tickers: Vec<TickerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerEntry {
    pub base: String,
    pub target: String,
    pub market: TickerMarket,
    pub last: Option<f64>,
    pub volume: Option<f64>,
    pub converted_last: Option<ConvertedField>,
    pub converted_volume: Option<ConvertedField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerMarket {
    pub name: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedField {
    pub usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(identifier: &str, last: Option<f64>, usd: Option<f64>) -> TickerEntry {
        TickerEntry {
            base: "ABC".to_string(),
            target: "USDT".to_string(),
            market: TickerMarket {
                name: identifier.to_string(),
                identifier: identifier.to_string(),
            },
            last,
            volume: Some(1000.0),
            converted_last: usd.map(|u| ConvertedField { usd: Some(u) }),
            converted_volume: Some(ConvertedField { usd: Some(2000.0) }),
        }
    }

    #[test]
    fn test_venue_match_is_case_insensitive() {
        let tickers = vec![ticker("GATE", Some(1.0), None)];
        assert!(quote_for_venue(&tickers, &["gate"]).is_some());
        assert!(quote_for_venue(&tickers, &["mexc", "mxc"]).is_none());
    }

    #[test]
    fn test_prefers_usd_converted_fields() {
        let tickers = vec![ticker("gate", Some(1.0), Some(1.02))];
        let q = quote_for_venue(&tickers, &["gate"]).unwrap();
        assert_eq!(q.price, 1.02);
        assert_eq!(q.volume, Some(2000.0));
    }

    #[test]
    fn test_falls_back_to_raw_last() {
        let mut t = ticker("mxc", Some(0.5), None);
        t.converted_volume = None;
        let q = quote_for_venue(&[t], &["mexc", "mxc"]).unwrap();
        assert_eq!(q.price, 0.5);
        assert_eq!(q.volume, Some(1000.0));
    }

    #[test]
    fn test_no_price_means_no_quote() {
        let t = ticker("gate", None, None);
        assert!(quote_for_venue(&[t], &["gate"]).is_none());
    }

    #[test]
    fn test_market_entry_parses_real_shape() {
        let body = r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin",
            "market_cap":1280000000000.0,"last_updated":"2024-05-01T12:30:00.000Z",
            "current_price":65000.1}]"#;
        let entries: Vec<MarketEntry> = serde_json::from_str(body).unwrap();
        assert_eq!(entries[0].id, "bitcoin");
        assert!(entries[0].last_updated.is_some());
    }
}
