//! Podcast orchestration.
//!
//! Composes the script generator and the audio synthesizer into the three
//! request flows. Each flow is a single linear pipeline; errors from either
//! stage are returned unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PodcastError;
use crate::generator::{OpenAiTextGenerator, ScriptGenerator};
use crate::presenter::{Presenter, validate_presenters};
use crate::script::Script;
use crate::storage::AudioStore;
use crate::synthesizer::{AudioSynthesizer, GeneratedAudio};
use crate::tts::create_speech_provider;

/// Request to write a script (and optionally voice it).
#[derive(Debug, Clone, Deserialize)]
pub struct PodcastRequest {
    pub transcription: String,
    /// Free-text style hint; the configured default is used when absent.
    #[serde(default)]
    pub style: Option<String>,
    pub presenters: Vec<Presenter>,
    #[serde(default)]
    pub return_base64: bool,
}

/// Request to voice an existing script.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioRequest {
    #[serde(flatten)]
    pub script: Script,
    pub presenters: Vec<Presenter>,
    #[serde(default)]
    pub return_base64: bool,
}

/// Result of the full pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PodcastEpisode {
    pub script: Script,
    pub audio: GeneratedAudio,
}

pub struct PodcastOrchestrator {
    generator: ScriptGenerator,
    synthesizer: AudioSynthesizer,
}

impl PodcastOrchestrator {
    pub fn new(generator: ScriptGenerator, synthesizer: AudioSynthesizer) -> Self {
        Self {
            generator,
            synthesizer,
        }
    }

    /// Build the orchestrator with the providers named in `config`.
    pub fn from_config(config: Arc<Config>) -> Result<Self, PodcastError> {
        config.validate()?;

        let text = Arc::new(OpenAiTextGenerator::new(&config.script)?);
        let speech = create_speech_provider(&config.speech)?;
        let store = AudioStore::new(&config.storage.files_dir)?;

        let synthesizer =
            AudioSynthesizer::new(speech, store, config.speech.max_concurrent_requests);
        let generator = ScriptGenerator::new(text, config);

        Ok(Self::new(generator, synthesizer))
    }

    pub fn store(&self) -> &AudioStore {
        self.synthesizer.store()
    }

    /// Generate a script only.
    pub async fn script_only(&self, request: &PodcastRequest) -> Result<Script, PodcastError> {
        let style = request
            .style
            .as_deref()
            .unwrap_or_else(|| self.generator.default_style());

        self.generator
            .generate_script(&request.transcription, style, &request.presenters)
            .await
    }

    /// Generate a script, then voice it.
    ///
    /// Every presenter needs a voice; this is checked before the script is
    /// generated so a doomed request makes no provider calls.
    pub async fn full_podcast(
        &self,
        request: &PodcastRequest,
    ) -> Result<PodcastEpisode, PodcastError> {
        if let Some(missing) = request.presenters.iter().find(|p| p.voice().is_none()) {
            return Err(PodcastError::UnresolvedSpeaker(missing.name.clone()));
        }

        let script = self.script_only(request).await?;
        let audio = self
            .synthesizer
            .synthesize(&script, &request.presenters, request.return_base64)
            .await?;

        Ok(PodcastEpisode { script, audio })
    }

    /// Voice a caller-supplied script.
    pub async fn audio_from_script(
        &self,
        request: &AudioRequest,
    ) -> Result<GeneratedAudio, PodcastError> {
        validate_presenters(&request.presenters, 1)?;

        self.synthesizer
            .synthesize(&request.script, &request.presenters, request.return_base64)
            .await
    }
}
