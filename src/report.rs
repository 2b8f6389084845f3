//! Terminal Presenter & CSV Export
//!
//! Rendering is a pure function of the already filtered and sorted rows —
//! the CSV export serializes exactly what the table shows, never the raw
//! dataset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::CoinAnalysis;

pub const CSV_HEADER: &str =
    "symbol,name,gate_price,mexc_spot_price,mexc_fut_price,spread_pct,gate_vol,mexc_vol,listed_at";

/// Render the result table as one string, ready for stdout.
pub fn render_table(rows: &[CoinAnalysis]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<22} {:>14} {:>14} {:>14} {:>9} {:>14} {:>14}  {}\n",
        "COIN", "GATE", "MEXC SPOT", "MEXC FUT", "SPREAD%", "GATE VOL", "MEXC VOL", "UPDATED"
    ));
    out.push_str(&"-".repeat(126));
    out.push('\n');

    if rows.is_empty() {
        out.push_str("  no opportunities matched the current filters\n");
        return out;
    }

    for a in rows {
        let coin = format!("{} ({})", a.coin.symbol, truncate(&a.coin.name, 12));
        out.push_str(&format!(
            "{:<22} {:>14} {:>14} {:>14} {:>9} {:>14} {:>14}  {}\n",
            truncate(&coin, 22),
            fmt_price(a.quotes.gate_spot.as_ref().map(|q| q.price)),
            fmt_price(a.quotes.mexc_spot.as_ref().map(|q| q.price)),
            fmt_price(a.quotes.mexc_futures.as_ref().map(|q| q.price)),
            a.spread_pct
                .map(|s| format!("{:+.2}", s))
                .unwrap_or_else(|| "-".to_string()),
            fmt_volume(a.quotes.gate_spot.as_ref().and_then(|q| q.volume)),
            fmt_volume(a.quotes.mexc_spot.as_ref().and_then(|q| q.volume)),
            a.coin
                .last_updated
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }

    out
}

/// Serialize rows to CSV. Every field is double-quoted with internal quotes
/// doubled, matching the dashboard's export format.
pub fn csv_document(rows: &[CoinAnalysis]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for a in rows {
        let fields = [
            a.coin.symbol.clone(),
            a.coin.name.clone(),
            opt_num(a.quotes.gate_spot.as_ref().map(|q| q.price)),
            opt_num(a.quotes.mexc_spot.as_ref().map(|q| q.price)),
            opt_num(a.quotes.mexc_futures.as_ref().map(|q| q.price)),
            opt_num(a.spread_pct),
            opt_num(a.quotes.gate_spot.as_ref().and_then(|q| q.volume)),
            opt_num(a.quotes.mexc_spot.as_ref().and_then(|q| q.volume)),
            a.coin
                .last_updated
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
        ];

        let line: Vec<String> = fields
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// Write the CSV next to the working directory as
/// `crypto-arb-<epoch-ms>.csv` and return the path.
pub async fn export_csv(rows: &[CoinAnalysis], dir: &std::path::Path) -> Result<PathBuf> {
    let filename = format!("crypto-arb-{}.csv", Utc::now().timestamp_millis());
    let path = dir.join(filename);

    tokio::fs::write(&path, csv_document(rows))
        .await
        .with_context(|| format!("Failed to write CSV export {}", path.display()))?;

    Ok(path)
}

fn fmt_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p >= 1.0 => format!("${:.4}", p),
        Some(p) => format!("${:.8}", p),
        None => "-".to_string(),
    }
}

fn fmt_volume(volume: Option<f64>) -> String {
    match volume {
        Some(v) if v >= 1_000_000.0 => format!("${:.2}M", v / 1_000_000.0),
        Some(v) if v >= 1_000.0 => format!("${:.1}K", v / 1_000.0),
        Some(v) => format!("${:.0}", v),
        None => "-".to_string(),
    }
}

/// Plain `{}` keeps f64 round-trippable through the CSV.
fn opt_num(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
