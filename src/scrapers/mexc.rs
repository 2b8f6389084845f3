//! MEXC Spot & Futures Ticker Client
//!
//! The spot API speaks Binance-style concatenated symbols (`BTCUSDT`), the
//! contract API underscore pairs (`BTC_USDT`) wrapped in a success envelope.
//! Both sides absorb failures into `None` so one venue outage never sinks
//! the coin.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::models::PriceQuote;
use crate::scrapers::expand_guesses;
use crate::transport::FetchOrchestrator;

const SPOT_API_BASE: &str = "https://api.mexc.com/api/v3";
const CONTRACT_API_BASE: &str = "https://contract.mexc.com/api/v1";

const SPOT_TEMPLATES: &[&str] = &["{SYM}USDT", "{SYM}USDC"];
const FUTURES_TEMPLATES: &[&str] = &["{SYM}_USDT", "{SYM}_USD"];

pub struct MexcClient {
    http: Arc<FetchOrchestrator>,
}

impl MexcClient {
    pub fn new(http: Arc<FetchOrchestrator>) -> Self {
        Self { http }
    }

    /// Spot 24h ticker, first symbol guess with a positive price wins.
    pub async fn fetch_spot(&self, symbol: &str) -> Option<PriceQuote> {
        for pair in expand_guesses(SPOT_TEMPLATES, symbol) {
            let url = format!("{}/ticker/24hr?symbol={}", SPOT_API_BASE, pair);

            let ticker: SpotTicker = match self.http.fetch_json(&url).await {
                Ok(t) => t,
                Err(e) => {
                    debug!(pair = %pair, error = %e, "mexc spot fetch failed");
                    continue;
                }
            };

            let price = ticker.last_price.parse::<f64>().ok();
            let volume = ticker
                .quote_volume
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok());

            if let Some(quote) = price.and_then(|p| PriceQuote::checked(pair.as_str(), p, volume)) {
                return Some(quote);
            }
        }

        None
    }

    /// Perpetual contract ticker. The contract API wraps its payload in a
    /// `{success, code, data}` envelope.
    pub async fn fetch_futures(&self, symbol: &str) -> Option<PriceQuote> {
        for pair in expand_guesses(FUTURES_TEMPLATES, symbol) {
            let url = format!("{}/contract/ticker?symbol={}", CONTRACT_API_BASE, pair);

            let resp: ContractResponse = match self.http.fetch_json(&url).await {
                Ok(r) => r,
                Err(e) => {
                    debug!(pair = %pair, error = %e, "mexc futures fetch failed");
                    continue;
                }
            };

            let Some(data) = resp.data else {
                continue;
            };

            if let Some(quote) =
                PriceQuote::checked(pair.as_str(), data.last_price, data.amount24)
            {
                return Some(quote);
            }
        }

        None
    }
}

// ---- wire types (field names match the real APIs) ----

#[derive(Debug, Clone, Deserialize)]
struct SpotTicker {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContractResponse {
    #[allow(dead_code)]
    success: Option<bool>,
    data: Option<ContractTicker>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContractTicker {
    #[serde(rename = "lastPrice")]
    last_price: f64,
    /// 24h turnover in USDT
    #[serde(rename = "amount24")]
    amount24: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_and_futures_symbol_formats_differ() {
        assert_eq!(
            expand_guesses(SPOT_TEMPLATES, "DOGE"),
            vec!["DOGEUSDT", "DOGEUSDC"]
        );
        assert_eq!(
            expand_guesses(FUTURES_TEMPLATES, "DOGE"),
            vec!["DOGE_USDT", "DOGE_USD"]
        );
    }

    #[test]
    fn test_spot_ticker_parses_real_shape() {
        let body = r#"{"symbol":"BTCUSDT","lastPrice":"64870.11",
            "quoteVolume":"151234567.8","volume":"2331.7"}"#;
        let t: SpotTicker = serde_json::from_str(body).unwrap();
        assert_eq!(t.last_price, "64870.11");
    }

    #[test]
    fn test_contract_envelope_parses_real_shape() {
        let body = r#"{"success":true,"code":0,
            "data":{"symbol":"BTC_USDT","lastPrice":64875.3,"amount24":98765432.1}}"#;
        let r: ContractResponse = serde_json::from_str(body).unwrap();
        let data = r.data.unwrap();
        assert_eq!(data.last_price, 64875.3);
        assert_eq!(data.amount24, Some(98765432.1));
    }

    #[test]
    fn test_contract_envelope_without_data() {
        let body = r#"{"success":false,"code":1002}"#;
        let r: ContractResponse = serde_json::from_str(body).unwrap();
        assert!(r.data.is_none());
    }
}
