use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::{ModelId, VoiceSettings};
use crate::error::Result;
use crate::tts::{Synthesizer, SynthesizeResult};

pub const BASE_URL: &str = "https://api.elevenlabs.io/v1";

#[derive(Serialize)]
struct VoiceSettingsBody {
    stability: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_boost: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_speaker_boost: Option<bool>,
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettingsBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'a str>,
}

/// Talks to the TTS provider. Builds the request, sends it, and classifies
/// the response into a `SynthesizeResult` -- it does not retry. The caller
/// (`GenerationEngine`) owns retry policy.
pub struct TtsClient {
    client: Client,
}

impl TtsClient {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    /// Construct a client around a caller-supplied `reqwest::Client`, for
    /// wiring in a proxy-configured client per request.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn synthesize(
        &self,
        api_key: &str,
        text: &str,
        voice: &VoiceSettings,
    ) -> Result<SynthesizeResult> {
        let url = format!("{BASE_URL}/text-to-speech/{}", voice.voice_id);

        let body = SynthesizeRequest {
            text,
            model_id: voice.model_id.wire_id(),
            voice_settings: if voice.model_id.is_v3() {
                VoiceSettingsBody {
                    stability: voice.stability,
                    similarity_boost: None,
                    style: None,
                    use_speaker_boost: None,
                }
            } else {
                VoiceSettingsBody {
                    stability: voice.stability,
                    similarity_boost: Some(voice.similarity_boost),
                    style: Some(voice.style),
                    use_speaker_boost: Some(voice.speaker_boost),
                }
            },
            language_code: voice.language_code.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() || err.is_connect() => {
                return Ok(SynthesizeResult::TransientFailure(err.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        Ok(classify_response(response.status(), response.bytes().await?.to_vec()))
    }

    pub async fn query_credit(&self, api_key: &str) -> Result<crate::tts::credit::CreditInfo> {
        crate::tts::credit::fetch_credit(&self.client, BASE_URL, api_key).await
    }
}

#[async_trait]
impl Synthesizer for TtsClient {
    async fn synthesize(
        &self,
        api_key: &str,
        text: &str,
        voice: &VoiceSettings,
    ) -> Result<SynthesizeResult> {
        TtsClient::synthesize(self, api_key, text, voice).await
    }
}

fn classify_response(status: StatusCode, body: Vec<u8>) -> SynthesizeResult {
    if status.is_success() {
        return SynthesizeResult::Ok(body);
    }

    let message = String::from_utf8_lossy(&body).to_string();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::PAYMENT_REQUIRED => {
            SynthesizeResult::CredentialFailure(message)
        }
        StatusCode::TOO_MANY_REQUESTS => SynthesizeResult::TransientFailure(message),
        s if s.is_server_error() => SynthesizeResult::TransientFailure(message),
        _ => SynthesizeResult::PermanentFailure(message),
    }
}
