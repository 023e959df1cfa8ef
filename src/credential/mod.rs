pub mod pool;

use async_trait::async_trait;

use crate::config::constants::{CREDENTIAL_PREFIX, MIN_CREDENTIAL_LENGTH};
use crate::error::Result;

/// One API key and its known remaining-credit state.
#[derive(Debug, Clone)]
pub struct Credential {
    pub key: String,
    pub remaining_credit: Option<u64>,
    pub quarantined: bool,
}

impl Credential {
    pub fn new(key: String) -> Self {
        Self {
            key,
            remaining_credit: None,
            quarantined: false,
        }
    }
}

/// A line counts as a credential iff it starts with `sk_` and is at least
/// `MIN_CREDENTIAL_LENGTH` bytes long. Blank lines and `#`-comments are
/// ignored; anything else is silently skipped.
pub fn is_credential_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    trimmed.starts_with(CREDENTIAL_PREFIX) && trimmed.len() >= MIN_CREDENTIAL_LENGTH
}

pub fn parse_credentials(data: &str) -> Vec<Credential> {
    data.lines()
        .filter(|line| is_credential_line(line))
        .map(|line| Credential::new(line.trim().to_string()))
        .collect()
}

/// Out-of-scope remote credential source (an admin panel, say). The default
/// file-based loading in `pool::CredentialPool::load_from_file` covers the
/// concrete case this crate ships; this trait exists so a caller can wire in
/// something else without touching `CredentialPool`.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch_assigned_credentials(&self) -> Result<Vec<String>>;
}

/// Called when `CredentialPool` quarantines a credential, so a caller can
/// mirror that state elsewhere. No-op by default.
#[async_trait]
pub trait CredentialSink: Send + Sync {
    async fn report_quarantined(&self, _key: &str, _reason: &str) {}
}

pub struct NoopCredentialSink;

#[async_trait]
impl CredentialSink for NoopCredentialSink {}

/// Appends one `key reason` line per quarantine event to a file. The
/// concrete sink this crate ships for the run-local record invariant 9
/// requires ("present in the quarantine sink file"). Lines are
/// de-duplicated by exact match: the same `key reason` pair is written at
/// most once.
pub struct FileCredentialSink {
    path: std::path::PathBuf,
}

impl FileCredentialSink {
    pub fn new(path: std::path::PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialSink for FileCredentialSink {
    async fn report_quarantined(&self, key: &str, reason: &str) {
        use tokio::io::AsyncWriteExt;

        let line = format!("{key} {reason}");
        let existing = tokio::fs::read_to_string(&self.path).await.unwrap_or_default();
        if existing.lines().any(|l| l == line) {
            return;
        }

        if let Ok(mut file) = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
        {
            let _ = file.write_all(format!("{line}\n").as_bytes()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credential_line() {
        let line = format!("sk_{}", "a".repeat(40));
        assert!(is_credential_line(&line));
    }

    #[test]
    fn test_too_short_is_rejected() {
        assert!(!is_credential_line("sk_short"));
    }

    #[test]
    fn test_wrong_prefix_is_rejected() {
        let line = format!("pk_{}", "a".repeat(40));
        assert!(!is_credential_line(&line));
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        assert!(!is_credential_line(""));
        assert!(!is_credential_line("   "));
        assert!(!is_credential_line("# a comment"));
    }

    #[test]
    fn test_parse_credentials_from_file_contents() {
        let key = format!("sk_{}", "b".repeat(40));
        let data = format!("# header\n\n{key}\nnot-a-key\n");
        let creds = parse_credentials(&data);
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].key, key);
    }

    #[tokio::test]
    async fn test_file_credential_sink_records_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarantine.log");
        let sink = FileCredentialSink::new(path.clone());

        sink.report_quarantined("K1", "out of credit").await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("K1"));
        assert!(contents.contains("out of credit"));
    }

    #[tokio::test]
    async fn test_file_credential_sink_deduplicates_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarantine.log");
        let sink = FileCredentialSink::new(path.clone());

        sink.report_quarantined("K1", "out of credit").await;
        sink.report_quarantined("K1", "out of credit").await;
        sink.report_quarantined("K1", "bad key").await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
