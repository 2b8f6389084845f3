//! Core Data Model
//! Mission: One shape for every coin, quote, and analysis flowing through a scan cycle
//!
//! Everything here is ephemeral: all entities are rebuilt from scratch on each
//! scan cycle. Only `ScanConfig` survives between cycles, and it is passed
//! explicitly rather than held in globals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One coin as listed by the market-cap ranking endpoint.
/// Identity is `id`; `symbol` is what the exchanges trade against USDT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A single price + volume observation for one coin on one venue.
/// `price` is always > 0 by construction; a zero or unparseable price means
/// the quote was never created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Trading pair as the venue spells it (e.g. "BTC_USDT")
    pub pair: String,
    /// Last traded price in USD terms
    pub price: f64,
    /// 24h volume in USD terms, if the venue reports one
    pub volume: Option<f64>,
}

impl PriceQuote {
    /// Build a quote, rejecting non-positive or non-finite prices.
    pub fn checked(pair: impl Into<String>, price: f64, volume: Option<f64>) -> Option<Self> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        let volume = volume.filter(|v| v.is_finite() && *v >= 0.0);
        Some(Self {
            pair: pair.into(),
            price,
            volume,
        })
    }
}

/// The three venue slots a scan tries to fill for each coin.
/// Any slot may stay empty; a missing quote degrades the analysis, it never
/// fails the coin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueQuotes {
    pub gate_spot: Option<PriceQuote>,
    pub mexc_spot: Option<PriceQuote>,
    pub mexc_futures: Option<PriceQuote>,
}

impl VenueQuotes {
    /// Largest reported volume across filled slots; slots without volume
    /// count as zero.
    pub fn max_volume(&self) -> f64 {
        [&self.gate_spot, &self.mexc_spot, &self.mexc_futures]
            .into_iter()
            .flatten()
            .map(|q| q.volume.unwrap_or(0.0))
            .fold(0.0, f64::max)
    }
}

/// One coin with its merged quotes and derived spread.
/// `spread_pct` is `Some` only when at least one spot price and the futures
/// price both exist; otherwise the record is dropped by the filter stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinAnalysis {
    pub coin: Coin,
    pub quotes: VenueQuotes,
    pub spot_avg: Option<f64>,
    pub futures_price: Option<f64>,
    /// Positive = futures above spot average (long spot / short futures)
    pub spread_pct: Option<f64>,
}

/// Explicit application state passed into every scan cycle.
/// Replaces the original dashboard's global mutable UI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum absolute spread (%) a row must show to be kept
    pub min_abs_spread_pct: f64,
    /// Minimum max-venue volume in USD; 0 disables the volume filter
    pub min_volume_usd: f64,
    /// Case-insensitive substring match over symbol / name / id; empty = off
    pub text_query: String,
    /// Only keep coins updated within this many days; 0 disables the filter
    pub max_age_days: u32,
    /// How many top-market-cap coins to pull per cycle
    pub page_size: usize,
    /// Coins fetched concurrently per batch
    pub batch_size: usize,
    /// Pacing delay between batches, milliseconds
    pub batch_delay_ms: u64,
    /// Auto-refresh interval in seconds
    pub interval_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_abs_spread_pct: 0.0,
            min_volume_usd: 0.0,
            text_query: String::new(),
            max_age_days: 0,
            page_size: 50,
            batch_size: 6,
            batch_delay_ms: 1200,
            interval_secs: 60,
        }
    }
}

impl ScanConfig {
    /// Build defaults from the environment (.env supported), leaving anything
    /// unset at its built-in default. CLI flags override these in main.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let mut cfg = Self::default();

        fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.parse().ok())
        }

        if let Some(v) = env_parse("ARBWATCH_MIN_SPREAD_PCT") {
            cfg.min_abs_spread_pct = v;
        }
        if let Some(v) = env_parse("ARBWATCH_MIN_VOLUME_USD") {
            cfg.min_volume_usd = v;
        }
        if let Ok(v) = std::env::var("ARBWATCH_TEXT_QUERY") {
            cfg.text_query = v;
        }
        if let Some(v) = env_parse("ARBWATCH_MAX_AGE_DAYS") {
            cfg.max_age_days = v;
        }
        if let Some(v) = env_parse::<usize>("ARBWATCH_PAGE_SIZE") {
            cfg.page_size = v.clamp(1, 250);
        }
        if let Some(v) = env_parse::<usize>("ARBWATCH_BATCH_SIZE") {
            cfg.batch_size = v.clamp(1, 32);
        }
        if let Some(v) = env_parse("ARBWATCH_BATCH_DELAY_MS") {
            cfg.batch_delay_ms = v;
        }
        if let Some(v) = env_parse::<u64>("ARBWATCH_INTERVAL_SECS") {
            cfg.interval_secs = v.max(1);
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_rejects_bad_prices() {
        assert!(PriceQuote::checked("BTC_USDT", 0.0, None).is_none());
        assert!(PriceQuote::checked("BTC_USDT", -1.5, None).is_none());
        assert!(PriceQuote::checked("BTC_USDT", f64::NAN, None).is_none());
        assert!(PriceQuote::checked("BTC_USDT", 42000.0, Some(1e6)).is_some());
    }

    #[test]
    fn test_quote_drops_negative_volume() {
        let q = PriceQuote::checked("ETH_USDT", 3000.0, Some(-5.0)).unwrap();
        assert_eq!(q.volume, None);
    }

    #[test]
    fn test_max_volume_counts_missing_as_zero() {
        let quotes = VenueQuotes {
            gate_spot: PriceQuote::checked("A_USDT", 1.0, Some(50.0)),
            mexc_spot: PriceQuote::checked("AUSDT", 1.0, Some(10.0)),
            mexc_futures: PriceQuote::checked("A_USDT", 1.0, None),
        };
        assert_eq!(quotes.max_volume(), 50.0);

        let empty = VenueQuotes::default();
        assert_eq!(empty.max_volume(), 0.0);
    }
}
