//! Text-to-speech providers.
//!
//! A [`SpeechProvider`] turns one line of text plus a voice identity into one
//! audio clip. Providers are remote HTTP services; failures are reported as
//! upstream errors and never retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::audio::AudioFormat;
use crate::config::{SpeechConfig, SpeechProviderKind};
use crate::error::PodcastError;

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` with the voice `voice_id`, returning one encoded clip.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, PodcastError>;

    /// Container format of the clips this provider returns.
    fn format(&self) -> AudioFormat;

    /// Provider name used in error messages and logs.
    fn name(&self) -> &str;
}

/// Build the provider selected in the configuration.
pub fn create_speech_provider(
    config: &SpeechConfig,
) -> Result<Arc<dyn SpeechProvider>, PodcastError> {
    let client = http_client(config.timeout_secs)?;

    let provider: Arc<dyn SpeechProvider> = match config.provider {
        SpeechProviderKind::ElevenLabs => {
            if config.format != AudioFormat::Mp3 {
                return Err(PodcastError::Config(
                    "the elevenlabs provider only produces mp3".to_string(),
                ));
            }
            Arc::new(ElevenLabsSpeech::new(client, config))
        }
        SpeechProviderKind::OpenAi => Arc::new(OpenAiSpeech::new(client, config)),
    };

    tracing::info!(
        provider = provider.name(),
        format = provider.format().extension(),
        "Speech provider configured"
    );

    Ok(provider)
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, PodcastError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(30)))
        .build()
        .map_err(|e| PodcastError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Read a provider response, turning non-success statuses and empty bodies into errors.
async fn read_audio(provider: &str, response: reqwest::Response) -> Result<Vec<u8>, PodcastError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(PodcastError::upstream(
            provider,
            format!("status {}: {}", status, body),
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PodcastError::upstream(provider, format!("body: {}", e)))?;

    if bytes.is_empty() {
        return Err(PodcastError::upstream(provider, "empty audio response"));
    }

    Ok(bytes.to_vec())
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// ElevenLabs `text-to-speech/{voice_id}` endpoint.
pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsSpeech {
    pub fn new(client: reqwest::Client, config: &SpeechConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, PodcastError> {
        if self.api_key.is_empty() {
            return Err(PodcastError::upstream(self.name(), "API key is not set"));
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, voice_id);
        let body = ElevenLabsRequest {
            text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: self.stability,
                similarity_boost: self.similarity_boost,
            },
        };

        tracing::debug!(voice_id = %voice_id, chars = text.len(), "Sending line to ElevenLabs");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| PodcastError::upstream(self.name(), format!("request: {}", e)))?;

        read_audio(self.name(), response).await
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}

#[derive(Serialize)]
struct OpenAiSpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// OpenAI-compatible `audio/speech` endpoint. The voice ID is the voice name.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    format: AudioFormat,
}

impl OpenAiSpeech {
    pub fn new(client: reqwest::Client, config: &SpeechConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            format: config.format,
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, PodcastError> {
        let url = format!("{}/audio/speech", self.base_url);
        let body = OpenAiSpeechRequest {
            model: &self.model,
            voice: voice_id,
            input: text,
            response_format: self.format.extension(),
        };

        tracing::debug!(voice = %voice_id, chars = text.len(), "Sending line to OpenAI speech");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PodcastError::upstream(self.name(), format!("request: {}", e)))?;

        read_audio(self.name(), response).await
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn name(&self) -> &str {
        "openai-speech"
    }
}
