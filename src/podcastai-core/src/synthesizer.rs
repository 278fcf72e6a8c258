//! Audio synthesis for a whole script.
//!
//! One provider call per script line, fanned out through a bounded pool.
//! Results are collected by line index, so the final audio always follows
//! script order regardless of which call finishes first.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::audio::{self, AudioFormat};
use crate::error::PodcastError;
use crate::presenter::Presenter;
use crate::script::Script;
use crate::storage::{AudioStore, output_filename};
use crate::tts::SpeechProvider;

/// How the generated audio is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOutput {
    /// Written to the audio store under this file name.
    File { filename: String },
    /// Returned inline; nothing was written.
    Base64(String),
}

/// A synthesized podcast.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedAudio {
    pub title: String,
    pub format: AudioFormat,
    /// Number of clips joined, one per script line.
    pub clip_count: usize,
    pub output: AudioOutput,
}

pub struct AudioSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    store: AudioStore,
    max_concurrent_requests: usize,
}

impl AudioSynthesizer {
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        store: AudioStore,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            provider,
            store,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Synthesize every line of `script` and join the clips in script order.
    ///
    /// Speakers are resolved to voices before any provider call. If any line
    /// fails, the whole operation fails and nothing is written.
    pub async fn synthesize(
        &self,
        script: &Script,
        presenters: &[Presenter],
        return_base64: bool,
    ) -> Result<GeneratedAudio, PodcastError> {
        let voices = resolve_voices(script, presenters)?;
        let format = self.provider.format();

        tracing::info!(
            provider = self.provider.name(),
            title = %script.title,
            lines = script.lines.len(),
            concurrency = self.max_concurrent_requests,
            "Synthesizing script"
        );

        let clips = self.synthesize_lines(script, &voices).await?;
        let combined = audio::concatenate(format, &clips)?;

        let output = if return_base64 {
            AudioOutput::Base64(BASE64.encode(&combined))
        } else {
            let filename = output_filename(&script.title, format);
            self.store.save(&filename, &combined).await?;
            AudioOutput::File { filename }
        };

        tracing::info!(
            clips = clips.len(),
            bytes = combined.len(),
            inline = return_base64,
            "Podcast audio ready"
        );

        Ok(GeneratedAudio {
            title: script.title.clone(),
            format,
            clip_count: clips.len(),
            output,
        })
    }

    /// Returns one clip per line, indexed like `script.lines`.
    async fn synthesize_lines(
        &self,
        script: &Script,
        voices: &[&str],
    ) -> Result<Vec<Vec<u8>>, PodcastError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));

        let tasks = script
            .lines
            .iter()
            .zip(voices.iter().copied())
            .enumerate()
            .map(|(index, (line, voice_id))| {
                let semaphore = Arc::clone(&semaphore);
                let provider = Arc::clone(&self.provider);
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| PodcastError::upstream(provider.name(), e.to_string()))?;

                    tracing::debug!(index, speaker = %line.speaker, "Synthesizing line");
                    let clip = provider
                        .synthesize(&line.line, voice_id)
                        .await
                        .inspect_err(|e| {
                            tracing::error!(index, error = %e, "Line synthesis failed");
                        })?;

                    Ok::<_, PodcastError>((index, clip))
                }
            });

        let mut indexed = try_join_all(tasks).await?;
        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, clip)| clip).collect())
    }
}

/// Map each script line to its speaker's voice ID.
///
/// Fails on the first speaker that has no presenter with a non-empty voice.
fn resolve_voices<'a>(
    script: &Script,
    presenters: &'a [Presenter],
) -> Result<Vec<&'a str>, PodcastError> {
    if script.lines.is_empty() {
        return Err(PodcastError::Validation("script has no lines".to_string()));
    }

    let by_name: HashMap<&str, &str> = presenters
        .iter()
        .filter_map(|p| p.voice().map(|v| (p.name.trim(), v)))
        .collect();

    script
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if line.line.trim().is_empty() {
                return Err(PodcastError::Validation(format!(
                    "script line {} is empty",
                    i + 1
                )));
            }
            by_name
                .get(line.speaker.trim())
                .copied()
                .ok_or_else(|| PodcastError::UnresolvedSpeaker(line.speaker.clone()))
        })
        .collect()
}
