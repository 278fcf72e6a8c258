//! Podcast presenter definitions.
//!
//! A presenter is a named voice persona: personality text steers script
//! generation, the voice ID selects a synthesized voice.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PodcastError;

/// A presenter taking part in the podcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Presenter {
    /// Display name, unique within a request. Stored trimmed.
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    /// Free-text personality used as generation guidance.
    #[serde(default)]
    pub personality: String,
    /// Text-to-speech voice identity. Only needed for synthesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl Presenter {
    /// Create a presenter with the given name and personality.
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            personality: personality.into(),
            voice_id: None,
        }
    }

    /// Set the voice ID for synthesis.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// The voice ID, if present and non-blank.
    pub fn voice(&self) -> Option<&str> {
        self.voice_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Name plus personality, as embedded in the generation prompt.
    pub fn profile(&self) -> String {
        if self.personality.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.personality.trim())
        }
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Check the presenter list: at least `min` entries, non-blank and distinct names.
pub fn validate_presenters(presenters: &[Presenter], min: usize) -> Result<(), PodcastError> {
    if presenters.len() < min {
        return Err(PodcastError::InvalidPresenterCount {
            min,
            actual: presenters.len(),
        });
    }

    let mut seen = HashSet::new();
    for presenter in presenters {
        let name = presenter.name.trim();
        if name.is_empty() {
            return Err(PodcastError::Validation(
                "presenter name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name) {
            return Err(PodcastError::DuplicatePresenter(name.to_string()));
        }
    }

    Ok(())
}
