//! PodcastAI Core Library
//!
//! Turns a transcription into a multi-presenter podcast script and voices
//! that script into a single audio file.

pub mod audio;
pub mod config;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod presenter;
pub mod script;
pub mod storage;
pub mod synthesizer;
pub mod tts;

pub use audio::AudioFormat;
pub use config::{Config, default_config};
pub use error::PodcastError;
pub use generator::{OpenAiTextGenerator, ScriptGenerator, TextGenerator};
pub use orchestrator::{AudioRequest, PodcastEpisode, PodcastOrchestrator, PodcastRequest};
pub use presenter::Presenter;
pub use script::{Script, ScriptLine};
pub use storage::AudioStore;
pub use synthesizer::{AudioOutput, AudioSynthesizer, GeneratedAudio};
pub use tts::{SpeechProvider, create_speech_provider};
