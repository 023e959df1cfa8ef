pub mod constants;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// How `ProxyPool` obtains and rotates upstream proxy endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    #[serde(rename = "no_proxy")]
    None,
    Rotation,
}

impl Default for ProxyMode {
    fn default() -> Self {
        ProxyMode::None
    }
}

/// The model identifiers `VoiceSettings` accepts. The short, Rust-facing
/// name differs from the wire value the TTS provider expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    V3,
    FlashV25,
    FlashV2,
    TurboV25,
    TurboV2,
    MultilingualV2,
}

impl ModelId {
    /// The identifier placed in the request body sent to the provider.
    pub fn wire_id(self) -> &'static str {
        match self {
            ModelId::V3 => "eleven_v3",
            ModelId::FlashV25 => "eleven_flash_v2_5",
            ModelId::FlashV2 => "eleven_flash_v2",
            ModelId::TurboV25 => "eleven_turbo_v2_5",
            ModelId::TurboV2 => "eleven_turbo_v2",
            ModelId::MultilingualV2 => "eleven_multilingual_v2",
        }
    }

    /// `v3` drops `similarity_boost`, `style`, and `use_speaker_boost` from
    /// the request body; other models send the full settings.
    pub fn is_v3(self) -> bool {
        matches!(self, ModelId::V3)
    }

    /// Per-request character cap tighter than the generic chunk size, or
    /// `None` if this model has no model-specific cap.
    pub fn char_limit(self) -> Option<usize> {
        match self {
            ModelId::V3 => Some(constants::V3_CHAR_LIMIT),
            _ => None,
        }
    }
}

/// Voice and model parameters sent with every synthesis request. Field names
/// follow the persisted-config wire schema (`model`, `voice`, `similarity`),
/// which differs from the Rust-facing names used elsewhere in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(rename = "model")]
    pub model_id: ModelId,
    #[serde(rename = "voice")]
    pub voice_id: String,
    /// Playback speed multiplier. Carried through the persisted config for
    /// round-trip fidelity; the TTS request body in `tts::client` has no
    /// place for it and does not send it.
    #[serde(default = "default_speed")]
    pub speed: f32,
    pub stability: f32,
    #[serde(rename = "similarity")]
    pub similarity_boost: f32,
    pub style: f32,
    pub speaker_boost: bool,
    pub language_code: Option<String>,
}

fn default_speed() -> f32 {
    1.0
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            model_id: ModelId::MultilingualV2,
            voice_id: String::new(),
            speed: default_speed(),
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            speaker_boost: true,
            language_code: None,
        }
    }
}

/// Tunables for a `GenerationEngine` run. Field names follow the
/// `api_settings` wire schema (`chunk_size`, `gen_delay_ms`, `timeout_s`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(rename = "chunk_size")]
    pub max_chunk_size: usize,
    pub concurrency: usize,
    #[serde(rename = "gen_delay_ms")]
    pub per_chunk_delay_ms: u64,
    pub max_retries: u32,
    #[serde(rename = "timeout_s")]
    pub request_timeout_secs: u64,
    pub credit_threshold: u64,
    pub proxy_mode: ProxyMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: constants::DEFAULT_MAX_CHUNK_SIZE,
            concurrency: constants::DEFAULT_CONCURRENCY,
            per_chunk_delay_ms: constants::DEFAULT_PER_CHUNK_DELAY_MS,
            max_retries: constants::DEFAULT_MAX_RETRIES,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            credit_threshold: constants::DEFAULT_CREDIT_THRESHOLD,
            proxy_mode: ProxyMode::None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PipelineError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_chunk_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The tighter of the configured chunk size and the model's own cap.
    pub fn effective_chunk_size(&self, model: ModelId) -> usize {
        match model.char_limit() {
            Some(limit) => self.max_chunk_size.min(limit),
            None => self.max_chunk_size,
        }
    }
}

/// One entry in the persisted `voices` list: a selectable voice the user has
/// saved, distinct from the `voice_settings.voice` currently in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceEntry {
    pub id: String,
    pub name: String,
}

/// The persisted JSON document: `api_settings`, `voice_settings`,
/// `proxy_links`, `voices`. Field names are part of the wire schema and must
/// not be renamed independently of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub api_settings: EngineConfig,
    pub voice_settings: VoiceSettings,
    #[serde(default)]
    pub proxy_links: Vec<String>,
    #[serde(default)]
    pub voices: Vec<VoiceEntry>,
}

impl PersistedConfig {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
