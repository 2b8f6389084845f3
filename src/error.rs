//! Scan Error Taxonomy
//!
//! Three failure classes, three very different policies:
//! - `Fetch` at the quote level is absorbed into a `None` slot by the engine;
//!   at the coin-list level it aborts the cycle and is shown to the user.
//! - `Parse` means the upstream answered with a shape we do not recognize.
//! - `NoData` is a well-formed empty result, reported as a status line and
//!   never treated as a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Upstream HTTP failure, including after exhausting the proxy chain
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Response arrived but did not match the expected shape
    #[error("unexpected response shape from {origin}: {reason}")]
    Parse { origin: String, reason: String },

    /// The upstream answered correctly with nothing in it
    #[error("no coins matched the current listing filters")]
    NoData,
}

impl ScanError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(source: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            origin: source.into(),
            reason: reason.to_string(),
        }
    }
}
