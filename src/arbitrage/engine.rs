//! Price Reconciliation Engine
//! Mission: Fill three venue slots per coin and turn them into analyses
//!
//! One scan cycle: list coins, fetch quotes in fixed-size concurrent batches
//! (batches strictly sequential with a pacing delay between them — the only
//! backpressure we apply), merge prices into spreads. Venue slots are filled
//! from the aggregated tickers endpoint first; anything still empty falls
//! back to direct exchange calls with ordered symbol guesses. A failed quote
//! degrades to an empty slot and never aborts the coin, the batch, or the
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::arbitrage::spread::compute_spread;
use crate::error::ScanError;
use crate::models::{Coin, CoinAnalysis, ScanConfig, VenueQuotes};
use crate::scrapers::coingecko::{quote_for_venue, TickerEntry};
use crate::scrapers::{CoinGeckoClient, GateClient, MexcClient};
use crate::transport::{FetchOrchestrator, TransportConfig};

/// Aggregated-ticker market identifiers per venue. CoinGecko has used both
/// spellings for MEXC over the years.
const GATE_IDENTIFIERS: &[&str] = &["gate", "gate_io"];
const MEXC_IDENTIFIERS: &[&str] = &["mxc", "mexc"];

pub struct ScanEngine {
    coingecko: CoinGeckoClient,
    gate: GateClient,
    mexc: MexcClient,
}

impl ScanEngine {
    pub fn new(transport: &TransportConfig) -> anyhow::Result<Self> {
        let http = Arc::new(FetchOrchestrator::new(transport)?);
        Ok(Self {
            coingecko: CoinGeckoClient::new(Arc::clone(&http)),
            gate: GateClient::new(Arc::clone(&http)),
            mexc: MexcClient::new(http),
        })
    }

    /// Run one full scan cycle and return the unfiltered analyses.
    /// Only the coin-list fetch can fail here; everything downstream
    /// degrades instead of failing.
    pub async fn scan(&self, config: &ScanConfig) -> Result<Vec<CoinAnalysis>, ScanError> {
        let coins = self
            .coingecko
            .list_recent_coins(config.max_age_days, config.page_size)
            .await?;

        if coins.is_empty() {
            return Err(ScanError::NoData);
        }

        let batch_size = config.batch_size.max(1);
        let mut analyses = Vec::with_capacity(coins.len());

        for (i, batch) in coins.chunks(batch_size).enumerate() {
            if i > 0 && config.batch_delay_ms > 0 {
                sleep(Duration::from_millis(config.batch_delay_ms)).await;
            }

            debug!(batch = i, coins = batch.len(), "fetching quote batch");
            let batch_results =
                join_all(batch.iter().map(|coin| self.analyze_coin(coin))).await;
            analyses.extend(batch_results);
        }

        let with_spread = analyses.iter().filter(|a| a.spread_pct.is_some()).count();
        info!(
            coins = analyses.len(),
            with_spread, "scan cycle quotes merged"
        );

        Ok(analyses)
    }

    /// Fetch and merge all venue quotes for one coin.
    async fn analyze_coin(&self, coin: &Coin) -> CoinAnalysis {
        let tickers = self.coingecko.fetch_tickers(&coin.id).await;
        let mut quotes = fill_from_aggregated(&tickers);

        // Direct venue fallback for whatever the aggregated endpoint missed.
        // The futures slot always lands here: the tickers endpoint only
        // carries spot markets.
        if quotes.gate_spot.is_none() {
            quotes.gate_spot = self.gate.fetch_spot(&coin.symbol).await;
        }
        if quotes.mexc_spot.is_none() {
            quotes.mexc_spot = self.mexc.fetch_spot(&coin.symbol).await;
        }
        if quotes.mexc_futures.is_none() {
            quotes.mexc_futures = self.mexc.fetch_futures(&coin.symbol).await;
        }

        if quotes.gate_spot.is_none() && quotes.mexc_spot.is_none() {
            warn!(coin = %coin.id, "no spot quote from any venue");
        }

        let spread = compute_spread(&quotes);
        CoinAnalysis {
            coin: coin.clone(),
            quotes,
            spot_avg: spread.spot_avg,
            futures_price: spread.futures_price,
            spread_pct: spread.spread_pct,
        }
    }
}

/// First pass over the aggregated tickers: one quote per venue slot, first
/// matching market wins. Futures are never served here.
fn fill_from_aggregated(tickers: &[TickerEntry]) -> VenueQuotes {
    VenueQuotes {
        gate_spot: quote_for_venue(tickers, GATE_IDENTIFIERS),
        mexc_spot: quote_for_venue(tickers, MEXC_IDENTIFIERS),
        mexc_futures: None,
    }
}
