//! arbwatch Library
//!
//! Exposes the scan pipeline for the binary and integration tests:
//! coin listing → venue quote fill → spread merge → filter/sort → render.

pub mod arbitrage;
pub mod error;
pub mod models;
pub mod report;
pub mod scrapers;
pub mod transport;
