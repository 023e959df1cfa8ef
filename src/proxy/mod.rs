pub mod pool;

/// A resolved upstream proxy connection, in `IP:PORT:USER:PASS` form, with
/// the instant it was fetched so the pool can decide when to refresh it.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    pub connection_string: String,
    pub fetched_at: std::time::Instant,
}

impl ProxyEndpoint {
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            fetched_at: std::time::Instant::now(),
        }
    }
}

/// Outcome of asking a proxy provider to resolve one key into a live
/// endpoint. Mirrors the provider's `status` field: 100 ready, 101 busy
/// (retry after the given wait), 102 (or anything else) failure.
#[derive(Debug, Clone)]
pub enum ProxyResolution {
    Ready(String),
    Busy { wait_seconds: u64 },
    Failed(String),
}
