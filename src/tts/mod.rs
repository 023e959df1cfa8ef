pub mod client;
pub mod credit;

use async_trait::async_trait;

use crate::config::VoiceSettings;
use crate::error::Result;

/// The seam `GenerationEngine` attempts a chunk through. `TtsClient` is the
/// production implementation; tests substitute a stub that returns a
/// scripted sequence of outcomes without making a network call.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        api_key: &str,
        text: &str,
        voice: &VoiceSettings,
    ) -> Result<SynthesizeResult>;
}

/// Outcome of a single synthesis request, classified by `TtsClient` but
/// never retried by it — only `GenerationEngine` decides whether and how to
/// retry.
#[derive(Debug)]
pub enum SynthesizeResult {
    /// Synthesis succeeded; the audio bytes are attached.
    Ok(Vec<u8>),
    /// Worth retrying with the same or a different credential (e.g. rate
    /// limited, server error, timeout).
    TransientFailure(String),
    /// The credential itself is the problem (unauthorized, out of quota);
    /// the engine should rotate credentials before retrying.
    CredentialFailure(String),
    /// Retrying will not help (e.g. malformed request, unknown voice).
    PermanentFailure(String),
}
