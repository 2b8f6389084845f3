pub mod coingecko; // Market-cap listing + aggregated per-coin tickers
pub mod gate; // Gate.io spot tickers (direct venue calls)
pub mod mexc; // MEXC spot + futures tickers (direct venue calls)

pub use coingecko::CoinGeckoClient;
pub use gate::GateClient;
pub use mexc::MexcClient;

/// Expand a venue's ordered symbol-format templates for one coin symbol.
/// Adding a format to a venue means adding one template, not new control
/// flow.
pub(crate) fn expand_guesses(templates: &[&str], symbol: &str) -> Vec<String> {
    let symbol = symbol.to_uppercase();
    templates
        .iter()
        .map(|t| t.replace("{SYM}", &symbol))
        .collect()
}
