//! arbwatch - Cross-Venue Crypto Spread Scanner
//! Mission: Surface futures-vs-spot price gaps between Gate.io and MEXC
//!
//! One scan cycle lists top-market-cap coins, fills three venue quote slots
//! per coin (aggregated tickers first, direct exchange calls as fallback),
//! merges them into spread percentages, filters and sorts, and renders a
//! terminal table. `--watch` repeats the cycle on a fixed interval; a failed
//! cycle is simply retried at the next tick.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use arbwatch::arbitrage::{filter_and_sort, ScanEngine};
use arbwatch::error::ScanError;
use arbwatch::models::ScanConfig;
use arbwatch::report;
use arbwatch::transport::TransportConfig;

#[derive(Parser, Debug)]
#[command(name = "arbwatch")]
#[command(about = "Cross-venue crypto futures/spot spread scanner")]
struct Args {
    /// Minimum absolute spread (%) a row must show
    #[arg(long, env = "ARBWATCH_MIN_SPREAD_PCT")]
    min_spread: Option<f64>,

    /// Minimum venue volume in USD (0 disables)
    #[arg(long, env = "ARBWATCH_MIN_VOLUME_USD")]
    min_volume: Option<f64>,

    /// Case-insensitive substring filter over symbol/name/id
    #[arg(long, env = "ARBWATCH_TEXT_QUERY")]
    query: Option<String>,

    /// Only keep coins updated within this many days (0 disables)
    #[arg(long, env = "ARBWATCH_MAX_AGE_DAYS")]
    max_age_days: Option<u32>,

    /// Top-market-cap coins fetched per cycle (1-250)
    #[arg(long, env = "ARBWATCH_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Keep scanning on a fixed interval instead of exiting after one cycle
    #[arg(long)]
    watch: bool,

    /// Auto-refresh interval in seconds (watch mode)
    #[arg(long, env = "ARBWATCH_INTERVAL_SECS")]
    interval: Option<u64>,

    /// Export each rendered cycle as crypto-arb-<epoch-ms>.csv
    #[arg(long)]
    csv: bool,

    /// Directory CSV exports are written to
    #[arg(long, default_value = ".")]
    csv_dir: PathBuf,

    /// Path to TOML transport config (proxy chain, timeout)
    #[arg(long, env = "ARBWATCH_TRANSPORT_CONFIG")]
    transport_config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Env/.env defaults first, CLI flags on top
    let mut config = ScanConfig::from_env();
    if let Some(v) = args.min_spread {
        config.min_abs_spread_pct = v;
    }
    if let Some(v) = args.min_volume {
        config.min_volume_usd = v;
    }
    if let Some(v) = args.query {
        config.text_query = v;
    }
    if let Some(v) = args.max_age_days {
        config.max_age_days = v;
    }
    if let Some(v) = args.page_size {
        config.page_size = v.clamp(1, 250);
    }
    if let Some(v) = args.interval {
        config.interval_secs = v.max(1);
    }

    let transport = TransportConfig::load(args.transport_config.as_deref()).await?;
    let engine = ScanEngine::new(&transport)?;

    info!(
        page_size = config.page_size,
        min_spread = config.min_abs_spread_pct,
        min_volume = config.min_volume_usd,
        watch = args.watch,
        "arbwatch starting"
    );

    if !args.watch {
        run_cycle(&engine, &config, args.csv, &args.csv_dir).await;
        return Ok(());
    }

    // Watch mode: one repeating timer, cycle awaited inside the tick so
    // cycles never overlap. Ctrl-C stops the loop; in-flight requests are
    // dropped with it.
    let mut ticker = interval(Duration::from_secs(config.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&engine, &config, args.csv, &args.csv_dir).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// One full scan cycle: fetch, merge, filter, render, optionally export.
/// A coin-list failure aborts the cycle (no partial render); the next tick
/// is the retry, with no backoff.
async fn run_cycle(engine: &ScanEngine, config: &ScanConfig, csv: bool, csv_dir: &Path) {
    let started = Instant::now();

    let analyses = match engine.scan(config).await {
        Ok(a) => a,
        Err(ScanError::NoData) => {
            println!("no coins found for the current listing filters");
            return;
        }
        Err(e) => {
            error!(error = %e, "scan cycle failed");
            println!("scan failed: {}", e);
            return;
        }
    };

    let listed = analyses.len();
    let rows = filter_and_sort(analyses, config);

    print!("{}", report::render_table(&rows));
    info!(
        listed,
        shown = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan cycle complete"
    );

    if csv {
        match report::export_csv(&rows, csv_dir).await {
            Ok(path) => info!(path = %path.display(), "CSV exported"),
            Err(e) => warn!(error = %e, "CSV export failed"),
        }
    }
}
