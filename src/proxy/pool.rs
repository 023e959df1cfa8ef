use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{PipelineError, Result};
use crate::proxy::{ProxyEndpoint, ProxyResolution};

lazy_static! {
    static ref WAIT_SECONDS_RE: Regex = Regex::new(r"(\d+)s").unwrap();
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: u32,
    #[serde(default)]
    proxyhttp: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

struct PoolState {
    endpoint: Option<ProxyEndpoint>,
    keys: Vec<String>,
    force_refresh: bool,
}

/// Lazily-resolved rotating proxy endpoint, shared process-wide rather than
/// per worker. A single mutex guards both the current endpoint and the key
/// pool it rotates over.
pub struct ProxyPool {
    client: Client,
    state: Mutex<PoolState>,
    max_staleness: Duration,
}

impl ProxyPool {
    pub fn new(keys: Vec<String>, max_staleness: Duration) -> Self {
        Self {
            client: Client::new(),
            state: Mutex::new(PoolState {
                endpoint: None,
                keys,
                force_refresh: false,
            }),
            max_staleness,
        }
    }

    /// Whether the current endpoint (if any) is old enough -- or has been
    /// explicitly flagged via `mark_needs_refresh` -- that a worker asking
    /// for a proxy should trigger a fresh resolution first.
    async fn needs_refresh(&self) -> bool {
        let state = self.state.lock().await;
        if state.force_refresh {
            return true;
        }
        match &state.endpoint {
            None => true,
            Some(endpoint) => endpoint.fetched_at.elapsed() >= self.max_staleness,
        }
    }

    /// Flip the refresh flag so the next `acquire` re-resolves regardless of
    /// staleness. Called after a synthesis attempt that used this proxy ends
    /// in a transient or permanent failure, since the current endpoint may
    /// no longer be good.
    pub async fn mark_needs_refresh(&self) {
        let mut state = self.state.lock().await;
        state.force_refresh = true;
    }

    /// Return a usable connection string, resolving a new one if the
    /// current one is missing or stale.
    pub async fn acquire(&self, provider_url_template: &str) -> Result<String> {
        if self.needs_refresh().await {
            self.refresh(provider_url_template).await?;
        }
        let state = self.state.lock().await;
        state
            .endpoint
            .as_ref()
            .map(|e| e.connection_string.clone())
            .ok_or_else(|| PipelineError::InvalidConfig("proxy pool has no usable endpoint".into()))
    }

    async fn pick_key(&self) -> Option<String> {
        use rand::seq::SliceRandom;
        let state = self.state.lock().await;
        state.keys.choose(&mut rand::thread_rng()).cloned()
    }

    /// Resolve one key against the provider. A `Busy` response is retried
    /// once after sleeping for the advertised wait; any other non-ready
    /// status is a failure.
    async fn resolve_key(&self, provider_url_template: &str, key: &str) -> Result<ProxyResolution> {
        let url = provider_url_template.replace("{KEY}", key);
        let response: ProviderResponse = self.client.get(&url).send().await?.json().await?;

        match response.status {
            100 => {
                let proxyhttp = response
                    .proxyhttp
                    .ok_or_else(|| PipelineError::InvalidConfig("ready response missing proxyhttp".into()))?;
                Ok(ProxyResolution::Ready(proxyhttp))
            }
            101 => {
                let message = response.message.unwrap_or_default();
                let wait_seconds = parse_wait_seconds(&message).unwrap_or(1);
                Ok(ProxyResolution::Busy { wait_seconds })
            }
            102 => Ok(ProxyResolution::Failed(format!("proxy key {key} rejected as invalid"))),
            other => Ok(ProxyResolution::Failed(format!(
                "proxy provider returned status {other}"
            ))),
        }
    }

    async fn refresh(&self, provider_url_template: &str) -> Result<()> {
        let key = self
            .pick_key()
            .await
            .ok_or_else(|| PipelineError::InvalidConfig("proxy pool has no keys configured".into()))?;

        let resolution = self.resolve_key(provider_url_template, &key).await?;
        let resolution = match resolution {
            ProxyResolution::Busy { wait_seconds } => {
                sleep(Duration::from_secs(wait_seconds)).await;
                self.resolve_key(provider_url_template, &key).await?
            }
            other => other,
        };

        match resolution {
            ProxyResolution::Ready(connection_string) => {
                let mut state = self.state.lock().await;
                state.endpoint = Some(ProxyEndpoint::new(connection_string));
                state.force_refresh = false;
                Ok(())
            }
            ProxyResolution::Busy { .. } => Err(PipelineError::InvalidConfig(
                "proxy provider still busy after retry".into(),
            )),
            ProxyResolution::Failed(msg) => Err(PipelineError::InvalidConfig(msg)),
        }
    }
}

fn parse_wait_seconds(message: &str) -> Option<u64> {
    WAIT_SECONDS_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub type SharedProxyPool = Arc<ProxyPool>;
