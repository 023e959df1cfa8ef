use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::credential::pool::CredentialPool;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct CreditInfo {
    pub character_count: u64,
    pub character_limit: u64,
}

impl CreditInfo {
    pub fn remaining(&self) -> u64 {
        self.character_limit.saturating_sub(self.character_count)
    }

    pub fn below_threshold(&self, threshold: u64) -> bool {
        self.remaining() < threshold
    }
}

#[derive(Deserialize)]
struct SubscriptionResponse {
    character_count: u64,
    character_limit: u64,
}

/// Queries `/subscription` for a credential's `character_count` and
/// `character_limit`. Used to quarantine credentials below
/// `EngineConfig::credit_threshold` before they're handed a chunk.
pub async fn fetch_credit(client: &Client, base_url: &str, api_key: &str) -> Result<CreditInfo> {
    let response: SubscriptionResponse = client
        .get(format!("{base_url}/subscription"))
        .header("xi-api-key", api_key)
        .send()
        .await?
        .json()
        .await?;

    Ok(CreditInfo {
        character_count: response.character_count,
        character_limit: response.character_limit,
    })
}

/// Checks a credential's remaining credit against
/// `EngineConfig::credit_threshold` and quarantines it in the pool if it
/// falls short, before it can be handed a chunk to synthesize.
pub struct CreditProbe {
    client: Client,
    base_url: String,
    threshold: u64,
}

impl CreditProbe {
    pub fn new(client: Client, base_url: String, threshold: u64) -> Self {
        Self {
            client,
            base_url,
            threshold,
        }
    }

    /// Fetch credit for `api_key` and quarantine it in `pool` if it's below
    /// threshold. Returns the fetched info either way.
    pub async fn check(&self, pool: &Arc<CredentialPool>, api_key: &str) -> Result<CreditInfo> {
        let info = fetch_credit(&self.client, &self.base_url, api_key).await?;
        pool.update_remaining_credit(api_key, info.remaining()).await;
        if info.below_threshold(self.threshold) {
            pool.quarantine(api_key, "below credit threshold").await;
        }
        Ok(info)
    }

    /// Probe every credential still active in `pool`, quarantining those
    /// below threshold, and return the aggregate remaining credit across the
    /// ones that answered successfully. Probes run concurrently but bounded
    /// to `max_concurrency` in flight at once, mirroring a worker pool
    /// rather than firing every request at once.
    pub async fn check_all(&self, pool: &Arc<CredentialPool>, max_concurrency: usize) -> u64 {
        let keys = pool.active_keys().await;
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

        let mut handles = Vec::with_capacity(keys.len());
        for key in keys {
            let client = self.client.clone();
            let base_url = self.base_url.clone();
            let threshold = self.threshold;
            let pool = Arc::clone(pool);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                let info = fetch_credit(&client, &base_url, &key).await.ok()?;
                pool.update_remaining_credit(&key, info.remaining()).await;
                if info.below_threshold(threshold) {
                    pool.quarantine(&key, "below credit threshold").await;
                }
                Some(info.remaining())
            }));
        }

        let mut total = 0u64;
        for handle in handles {
            if let Ok(Some(remaining)) = handle.await {
                total += remaining;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_subtracts_used() {
        let info = CreditInfo {
            character_count: 9500,
            character_limit: 10000,
        };
        assert_eq!(info.remaining(), 500);
    }

    #[test]
    fn test_below_threshold() {
        let info = CreditInfo {
            character_count: 9500,
            character_limit: 10000,
        };
        assert!(info.below_threshold(1000));
        assert!(!info.below_threshold(100));
    }

    #[test]
    fn test_remaining_saturates_when_over_limit() {
        let info = CreditInfo {
            character_count: 20000,
            character_limit: 10000,
        };
        assert_eq!(info.remaining(), 0);
    }
}
