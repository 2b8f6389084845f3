//! Spread Calculation
//! Mission: Merge whatever prices survived the fetch into one number
//!
//! Missing operands and a zero spot average yield `None`, never an error —
//! a coin with insufficient data is simply excluded downstream.

use serde::{Deserialize, Serialize};

use crate::models::VenueQuotes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadResult {
    /// Arithmetic mean of all available spot quotes
    pub spot_avg: Option<f64>,
    pub futures_price: Option<f64>,
    /// Positive = futures above spot average (long spot / short futures)
    pub spread_pct: Option<f64>,
}

/// Merge available spot/futures prices into a spread percentage.
pub fn compute_spread(quotes: &VenueQuotes) -> SpreadResult {
    let spot_prices: Vec<f64> = [&quotes.gate_spot, &quotes.mexc_spot]
        .into_iter()
        .flatten()
        .map(|q| q.price)
        .collect();

    let spot_avg = if spot_prices.is_empty() {
        None
    } else {
        Some(spot_prices.iter().sum::<f64>() / spot_prices.len() as f64)
    };

    let futures_price = quotes.mexc_futures.as_ref().map(|q| q.price);

    let spread_pct = match (spot_avg, futures_price) {
        (Some(spot), Some(fut)) if spot != 0.0 => Some((fut - spot) / spot * 100.0),
        _ => None,
    };

    SpreadResult {
        spot_avg,
        futures_price,
        spread_pct,
    }
}
