use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Mutex;

use crate::credential::{parse_credentials, Credential, CredentialSink, NoopCredentialSink};
use crate::error::{PipelineError, Result};

struct PoolState {
    credentials: Vec<Credential>,
    cursor: usize,
}

/// Thread-safe round-robin rotation over a set of API keys, with quarantine
/// for keys a caller has determined are exhausted or dead.
///
/// Rotation state (the key list plus the round-robin cursor) lives behind a
/// single mutex, mirroring how a bounded resource pool hands out its next
/// slot: `next()` locks once, advances the cursor, and returns a clone.
pub struct CredentialPool {
    state: Mutex<PoolState>,
    sink: Arc<dyn CredentialSink>,
}

impl CredentialPool {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                credentials,
                cursor: 0,
            }),
            sink: Arc::new(NoopCredentialSink),
        }
    }

    pub fn with_sink(credentials: Vec<Credential>, sink: Arc<dyn CredentialSink>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                credentials,
                cursor: 0,
            }),
            sink,
        }
    }

    /// Load credentials from a line-delimited file (see
    /// `credential::is_credential_line` for the line filter).
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).await?;
        let credentials = parse_credentials(&data);
        if credentials.is_empty() {
            return Err(PipelineError::InvalidConfig(format!(
                "no credentials found in {}",
                path.display()
            )));
        }
        Ok(Self::new(credentials))
    }

    /// Return the next non-quarantined credential, advancing the cursor by
    /// one slot regardless of whether that slot was usable, so a run of
    /// quarantined entries doesn't get revisited before live ones.
    pub async fn next(&self) -> Option<Credential> {
        let mut state = self.state.lock().await;
        let len = state.credentials.len();
        if len == 0 {
            return None;
        }

        for _ in 0..len {
            let idx = state.cursor % len;
            state.cursor = (state.cursor + 1) % len;
            if !state.credentials[idx].quarantined {
                return Some(state.credentials[idx].clone());
            }
        }
        None
    }

    /// Mark `key` quarantined so future `next()` calls skip it, and notify
    /// the sink.
    pub async fn quarantine(&self, key: &str, reason: &str) {
        {
            let mut state = self.state.lock().await;
            if let Some(cred) = state.credentials.iter_mut().find(|c| c.key == key) {
                cred.quarantined = true;
            }
        }
        self.sink.report_quarantined(key, reason).await;
    }

    pub async fn update_remaining_credit(&self, key: &str, remaining: u64) {
        let mut state = self.state.lock().await;
        if let Some(cred) = state.credentials.iter_mut().find(|c| c.key == key) {
            cred.remaining_credit = Some(remaining);
        }
    }

    pub async fn active_count(&self) -> usize {
        let state = self.state.lock().await;
        state.credentials.iter().filter(|c| !c.quarantined).count()
    }

    pub async fn total_count(&self) -> usize {
        let state = self.state.lock().await;
        state.credentials.len()
    }

    /// Keys of every credential not currently quarantined, in pool order.
    /// Used by `CreditProbe::check_all` to probe the set that's actually
    /// still eligible to be handed a chunk.
    pub async fn active_keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .credentials
            .iter()
            .filter(|c| !c.quarantined)
            .map(|c| c.key.clone())
            .collect()
    }
}
