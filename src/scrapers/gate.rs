//! Gate.io Spot Ticker Client
//!
//! Direct venue calls, used when the aggregated tickers endpoint did not
//! cover the Gate slot. Symbol formats are tried in declared order; the
//! first guess with a parseable positive price wins.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::models::PriceQuote;
use crate::scrapers::expand_guesses;
use crate::transport::FetchOrchestrator;

const API_BASE: &str = "https://api.gateio.ws/api/v4";

/// Ordered symbol-format guesses for Gate spot pairs
const SYMBOL_TEMPLATES: &[&str] = &["{SYM}_USDT", "{SYM}_USD"];

pub struct GateClient {
    http: Arc<FetchOrchestrator>,
}

impl GateClient {
    pub fn new(http: Arc<FetchOrchestrator>) -> Self {
        Self { http }
    }

    /// Try each symbol-format guess until one returns a usable spot quote.
    /// Failures are absorbed: `None` means "no quote", never an error.
    pub async fn fetch_spot(&self, symbol: &str) -> Option<PriceQuote> {
        for pair in expand_guesses(SYMBOL_TEMPLATES, symbol) {
            let url = format!("{}/spot/tickers?currency_pair={}", API_BASE, pair);

            let tickers: Vec<SpotTicker> = match self.http.fetch_json(&url).await {
                Ok(t) => t,
                Err(e) => {
                    debug!(pair = %pair, error = %e, "gate spot fetch failed");
                    continue;
                }
            };

            let Some(ticker) = tickers.into_iter().next() else {
                continue;
            };

            let price = ticker.last.parse::<f64>().ok();
            let volume = ticker
                .quote_volume
                .as_deref()
                .or(ticker.base_volume.as_deref())
                .and_then(|v| v.parse::<f64>().ok());

            if let Some(quote) = price.and_then(|p| PriceQuote::checked(pair.as_str(), p, volume)) {
                return Some(quote);
            }
        }

        None
    }
}

/// Gate returns numbers as strings; field names match the real API.
#[derive(Debug, Clone, Deserialize)]
struct SpotTicker {
    #[allow(dead_code)]
    currency_pair: String,
    last: String,
    base_volume: Option<String>,
    quote_volume: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_templates_try_usdt_first() {
        let guesses = expand_guesses(SYMBOL_TEMPLATES, "PEPE");
        assert_eq!(guesses, vec!["PEPE_USDT", "PEPE_USD"]);
    }

    #[test]
    fn test_spot_ticker_parses_real_shape() {
        let body = r#"[{"currency_pair":"BTC_USDT","last":"64870.2",
            "lowest_ask":"64871","highest_bid":"64870",
            "base_volume":"4321.5","quote_volume":"280312456.7"}]"#;
        let tickers: Vec<SpotTicker> = serde_json::from_str(body).unwrap();
        assert_eq!(tickers[0].last, "64870.2");
        assert_eq!(tickers[0].quote_volume.as_deref(), Some("280312456.7"));
    }
}
