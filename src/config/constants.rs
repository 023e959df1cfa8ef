/// Default maximum character count per chunk before a sentence is split off
/// into its own chunk.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 800;

/// `eleven_v3` enforces a tighter per-request character limit than the other
/// models. The engine applies the tighter of this and `max_chunk_size`.
pub const V3_CHAR_LIMIT: usize = 3000;

/// Default number of concurrent workers in the generation engine.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default delay inserted before each chunk's first attempt.
pub const DEFAULT_PER_CHUNK_DELAY_MS: u64 = 0;

/// Default number of retry attempts after the first, per chunk.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default remaining-credit floor below which a credential is quarantined.
pub const DEFAULT_CREDIT_THRESHOLD: u64 = 1000;

/// Minimum length (in bytes) a line from a credentials file must have,
/// in addition to the `sk_` prefix, to be treated as a credential.
pub const MIN_CREDENTIAL_LENGTH: usize = 40;

/// Prefix a credentials-file line must carry to be treated as a credential.
pub const CREDENTIAL_PREFIX: &str = "sk_";

/// Zero-padded width used for chunk file names (`chunk_001.txt`, ...).
pub const CHUNK_NUMBER_WIDTH: usize = 3;

/// Directory name suffix appended to the source file's stem to derive the
/// project directory (`speech.txt` -> `speech_tts/`).
pub const PROJECT_DIR_SUFFIX: &str = "_tts";

/// Subdirectory holding per-chunk source text.
pub const CHUNKS_TEXT_DIR: &str = "chunks_txt";

/// Subdirectory holding per-chunk synthesized audio.
pub const CHUNKS_AUDIO_DIR: &str = "chunks_audio";

/// Merge output is flagged as suspicious when its size falls outside this
/// fraction of the sum of its inputs. Warning only, never a hard failure.
pub const MERGE_SIZE_DELTA_WARN_FRACTION: f64 = 0.05;

/// Default proxy provider URL template used when `--proxy-mode rotation` is
/// selected and `TTS_PROXY_PROVIDER_URL` is not set. `{KEY}` is replaced with
/// the rotated proxy key before the request is sent.
pub const DEFAULT_PROXY_PROVIDER_URL: &str =
    "https://proxyxoay.shop/api/get.php?key={KEY}&nhamang=random&tinhthanh=0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_size_reasonable() {
        assert!(DEFAULT_MAX_CHUNK_SIZE > 0);
        assert!(DEFAULT_MAX_CHUNK_SIZE <= V3_CHAR_LIMIT);
    }

    #[test]
    fn test_credential_prefix_not_empty() {
        assert!(!CREDENTIAL_PREFIX.is_empty());
        assert_eq!(CREDENTIAL_PREFIX, "sk_");
    }

    #[test]
    fn test_concurrency_at_least_one() {
        assert!(DEFAULT_CONCURRENCY >= 1);
    }
}
