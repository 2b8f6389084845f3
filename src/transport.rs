//! HTTP Transport with Proxy Fallback Chain
//! Mission: Get the bytes back even when the direct route is blocked
//!
//! Every upstream call runs through an ordered list of transport strategies:
//! direct first, then each cross-origin relay in priority order. The first
//! strategy that answers with a 2xx wins; anything else falls through to the
//! next. There are no retries beyond the chain itself — the next scan cycle
//! is the retry mechanism.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ScanError;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = "arbwatch/0.1 (spread scanner)";

/// One way of reaching a URL. Proxies wrap the target into their own query
/// string; the orchestrator only cares about the rewritten URL and a name
/// for logging.
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite the target URL into whatever this strategy actually requests.
    fn request_url(&self, target: &str) -> String;
}

/// Plain direct request, no rewriting.
pub struct Direct;

impl FetchStrategy for Direct {
    fn name(&self) -> &str {
        "direct"
    }

    fn request_url(&self, target: &str) -> String {
        target.to_string()
    }
}

/// URL-in-query relay service (e.g. allorigins). The target goes
/// percent-encoded after the prefix.
pub struct Proxy {
    label: String,
    prefix: String,
}

impl Proxy {
    pub fn new(label: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
        }
    }
}

impl FetchStrategy for Proxy {
    fn name(&self) -> &str {
        &self.label
    }

    fn request_url(&self, target: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(target))
    }
}

/// TOML-overridable transport settings. Defaults match the relays the
/// original dashboard leaned on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Relay services tried, in order, after the direct attempt fails
    pub proxies: Vec<ProxyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub label: String,
    /// Prefix the percent-encoded target URL is appended to
    pub prefix: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxies: vec![
                ProxyConfig {
                    label: "allorigins".to_string(),
                    prefix: "https://api.allorigins.win/raw?url=".to_string(),
                },
                ProxyConfig {
                    label: "corsproxy".to_string(),
                    prefix: "https://corsproxy.io/?".to_string(),
                },
            ],
        }
    }
}

impl TransportConfig {
    pub async fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = tokio::fs::read_to_string(p)
                    .await
                    .with_context(|| format!("Failed to read transport config {}", p))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse transport config {}", p))
            }
            None => Ok(Self::default()),
        }
    }
}

/// Tries each strategy in order and returns the first successful body.
pub struct FetchOrchestrator {
    client: Client,
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl FetchOrchestrator {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let mut strategies: Vec<Box<dyn FetchStrategy>> = vec![Box::new(Direct)];
        for p in &config.proxies {
            strategies.push(Box::new(Proxy::new(p.label.clone(), p.prefix.clone())));
        }

        Ok(Self { client, strategies })
    }

    /// GET `target` through the fallback chain, returning the response body.
    /// Fails with `ScanError::Fetch` only after every strategy is exhausted.
    pub async fn fetch_text(&self, target: &str) -> Result<String, ScanError> {
        let mut last_reason = String::from("no strategies configured");

        for strategy in &self.strategies {
            let url = strategy.request_url(target);

            match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(strategy = strategy.name(), target, "fetch ok");
                    return resp.text().await.map_err(|e| ScanError::fetch(target, e));
                }
                Ok(resp) => {
                    last_reason = format!("HTTP {} via {}", resp.status(), strategy.name());
                    debug!(
                        strategy = strategy.name(),
                        status = %resp.status(),
                        target,
                        "fetch non-success, falling through"
                    );
                }
                Err(e) => {
                    last_reason = format!("{} via {}", e, strategy.name());
                    debug!(strategy = strategy.name(), error = %e, target, "fetch error, falling through");
                }
            }
        }

        warn!(target, reason = %last_reason, "all transport strategies failed");
        Err(ScanError::fetch(target, last_reason))
    }

    /// GET `target` and deserialize the body as JSON.
    pub async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        target: &str,
    ) -> Result<T, ScanError> {
        let body = self.fetch_text(target).await?;
        serde_json::from_str(&body).map_err(|e| ScanError::parse(target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_leaves_url_alone() {
        let s = Direct;
        assert_eq!(
            s.request_url("https://api.example.com/v1?x=1"),
            "https://api.example.com/v1?x=1"
        );
    }

    #[test]
    fn test_proxy_percent_encodes_target() {
        let p = Proxy::new("allorigins", "https://api.allorigins.win/raw?url=");
        let rewritten = p.request_url("https://api.gateio.ws/api/v4/spot/tickers?currency_pair=BTC_USDT");
        assert!(rewritten.starts_with("https://api.allorigins.win/raw?url=https%3A%2F%2F"));
        assert!(rewritten.contains("currency_pair%3DBTC_USDT"));
        // Nothing from the target may survive unencoded into the relay query
        assert!(!rewritten[p.prefix.len()..].contains('?'));
    }

    #[test]
    fn test_default_chain_order() {
        let cfg = TransportConfig::default();
        let orch = FetchOrchestrator::new(&cfg).unwrap();
        let names: Vec<&str> = orch.strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["direct", "allorigins", "corsproxy"]);
    }

    #[test]
    fn test_transport_config_toml_roundtrip() {
        let cfg = TransportConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        let back: TransportConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.proxies.len(), cfg.proxies.len());
        assert_eq!(back.timeout_secs, cfg.timeout_secs);
    }
}
