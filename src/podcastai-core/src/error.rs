//! Error types for the podcast pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid presenter count: expected at least {min}, got {actual}")]
    InvalidPresenterCount { min: usize, actual: usize },

    #[error("Duplicate presenter name: {0}")]
    DuplicatePresenter(String),

    #[error("Speaker '{0}' has no presenter with a voice_id")]
    UnresolvedSpeaker(String),

    #[error("{provider} request failed: {message}")]
    Upstream { provider: String, message: String },

    #[error("Generated script has an unexpected format: {0}")]
    GenerationFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PodcastError {
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Stable, machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PodcastError::Validation(_)
            | PodcastError::InvalidPresenterCount { .. }
            | PodcastError::DuplicatePresenter(_)
            | PodcastError::UnresolvedSpeaker(_) => "validation_error",
            PodcastError::Upstream { .. } => "upstream_error",
            PodcastError::GenerationFormat(_) => "generation_format_error",
            PodcastError::Storage(_) => "storage_error",
            PodcastError::FileNotFound(_) => "not_found",
            PodcastError::Config(_) => "config_error",
        }
    }
}

impl From<async_openai::error::OpenAIError> for PodcastError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        PodcastError::upstream("script generator", err.to_string())
    }
}
