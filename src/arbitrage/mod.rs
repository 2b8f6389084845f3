//! Price Reconciliation & Spread Detection
//!
//! The pipeline one scan cycle runs: engine (fetch + merge) → spread
//! (compute) → filter (drop + sort). Everything downstream of the coin list
//! degrades rather than fails.

pub mod engine;
pub mod filter;
pub mod spread;

pub use engine::ScanEngine;
pub use filter::filter_and_sort;
pub use spread::{compute_spread, SpreadResult};
