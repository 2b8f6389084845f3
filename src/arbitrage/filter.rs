//! Result Filtering & Sorting
//!
//! Pure functions over one cycle's analyses. Filtering drops coins with no
//! spread, too little spread, too little volume, or no text-query match;
//! sorting is stable descending by absolute spread so equal spreads keep
//! their original (market-cap) order.

use crate::models::{CoinAnalysis, ScanConfig};

/// Apply the user's filters and sort descending by |spread|.
/// Idempotent: running it twice with the same config yields the same order.
pub fn filter_and_sort(analyses: Vec<CoinAnalysis>, config: &ScanConfig) -> Vec<CoinAnalysis> {
    let query = config.text_query.trim().to_lowercase();

    let mut results: Vec<CoinAnalysis> = analyses
        .into_iter()
        .filter(|a| {
            let Some(spread) = a.spread_pct else {
                return false;
            };

            if spread.abs() < config.min_abs_spread_pct.abs() {
                return false;
            }

            if config.min_volume_usd > 0.0 && a.quotes.max_volume() < config.min_volume_usd {
                return false;
            }

            if !query.is_empty() {
                let c = &a.coin;
                let hit = c.symbol.to_lowercase().contains(&query)
                    || c.name.to_lowercase().contains(&query)
                    || c.id.to_lowercase().contains(&query);
                if !hit {
                    return false;
                }
            }

            true
        })
        .collect();

    results.sort_by(|a, b| {
        let sa = a.spread_pct.map(f64::abs).unwrap_or(0.0);
        let sb = b.spread_pct.map(f64::abs).unwrap_or(0.0);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coin, PriceQuote, VenueQuotes};

    fn analysis(id: &str, spread: Option<f64>, gate_vol: f64, mexc_vol: f64) -> CoinAnalysis {
        CoinAnalysis {
            coin: Coin {
                id: id.to_string(),
                symbol: id.to_uppercase(),
                name: format!("{} Coin", id),
                market_cap: 1_000_000.0,
                last_updated: None,
            },
            quotes: VenueQuotes {
                gate_spot: PriceQuote::checked("X_USDT", 1.0, Some(gate_vol)),
                mexc_spot: PriceQuote::checked("XUSDT", 1.0, Some(mexc_vol)),
                mexc_futures: spread
                    .and_then(|s| PriceQuote::checked("X_USDT", 1.0 + s / 100.0, None)),
            },
            spot_avg: Some(1.0),
            futures_price: spread.map(|s| 1.0 + s / 100.0),
            spread_pct: spread,
        }
    }

    #[test]
    fn test_null_spread_is_excluded() {
        let out = filter_and_sort(
            vec![analysis("a", None, 100.0, 100.0)],
            &ScanConfig::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_min_spread_compares_absolute_values() {
        let cfg = ScanConfig {
            min_abs_spread_pct: 2.0,
            ..ScanConfig::default()
        };
        let out = filter_and_sort(
            vec![
                analysis("up", Some(3.0), 100.0, 100.0),
                analysis("down", Some(-2.5), 100.0, 100.0),
                analysis("flat", Some(1.0), 100.0, 100.0),
            ],
            &cfg,
        );
        let ids: Vec<&str> = out.iter().map(|a| a.coin.id.as_str()).collect();
        assert_eq!(ids, vec!["up", "down"]);
    }

    #[test]
    fn test_min_volume_uses_max_across_quotes() {
        let a = analysis("a", Some(5.0), 50.0, 10.0);

        let strict = ScanConfig {
            min_volume_usd: 60.0,
            ..ScanConfig::default()
        };
        assert!(filter_and_sort(vec![a.clone()], &strict).is_empty());

        let loose = ScanConfig {
            min_volume_usd: 50.0,
            ..ScanConfig::default()
        };
        assert_eq!(filter_and_sort(vec![a], &loose).len(), 1);
    }

    #[test]
    fn test_text_query_matches_symbol_name_and_id() {
        let mut a = analysis("dogwifhat", Some(5.0), 100.0, 100.0);
        a.coin.symbol = "WIF".to_string();
        a.coin.name = "dogwifhat".to_string();

        for query in ["wif", "DOGWIF", "Dogwifhat"] {
            let cfg = ScanConfig {
                text_query: query.to_string(),
                ..ScanConfig::default()
            };
            assert_eq!(filter_and_sort(vec![a.clone()], &cfg).len(), 1, "query {}", query);
        }

        let miss = ScanConfig {
            text_query: "pepe".to_string(),
            ..ScanConfig::default()
        };
        assert!(filter_and_sort(vec![a], &miss).is_empty());
    }

    #[test]
    fn test_sort_is_descending_by_abs_spread_and_stable() {
        let out = filter_and_sort(
            vec![
                analysis("small", Some(1.0), 100.0, 100.0),
                analysis("neg_big", Some(-8.0), 100.0, 100.0),
                analysis("tie_first", Some(4.0), 100.0, 100.0),
                analysis("tie_second", Some(-4.0), 100.0, 100.0),
            ],
            &ScanConfig::default(),
        );
        let ids: Vec<&str> = out.iter().map(|a| a.coin.id.as_str()).collect();
        assert_eq!(ids, vec!["neg_big", "tie_first", "tie_second", "small"]);

        for w in out.windows(2) {
            assert!(
                w[0].spread_pct.unwrap().abs() >= w[1].spread_pct.unwrap().abs(),
                "output must be monotonic in |spread|"
            );
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let input = vec![
            analysis("a", Some(2.0), 100.0, 100.0),
            analysis("b", Some(-7.0), 100.0, 100.0),
            analysis("c", Some(4.5), 100.0, 100.0),
        ];
        let cfg = ScanConfig {
            min_abs_spread_pct: 1.0,
            ..ScanConfig::default()
        };

        let once = filter_and_sort(input, &cfg);
        let twice = filter_and_sort(once.clone(), &cfg);

        let ids = |v: &[CoinAnalysis]| v.iter().map(|a| a.coin.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&once), ids(&twice));
    }
}
