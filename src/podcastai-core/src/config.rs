//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::AudioFormat;
use crate::error::PodcastError;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub script: ScriptConfig,
    pub speech: SpeechConfig,
    pub storage: StorageConfig,
    pub prompts: PromptsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for returned audio URLs, e.g. `https://podcasts.example.com`.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: None,
        }
    }
}

/// Generative-text provider (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub min_presenters: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 4096,
            temperature: 0.8,
            timeout_secs: 120,
            min_presenters: 2,
        }
    }
}

/// Which text-to-speech backend to call.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum SpeechProviderKind {
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    #[serde(rename = "openai")]
    OpenAi,
}

/// Text-to-speech provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub provider: SpeechProviderKind,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub format: AudioFormat,
    pub stability: f32,
    pub similarity_boost: f32,
    pub max_concurrent_requests: usize,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProviderKind::ElevenLabs,
            api_base: "https://api.elevenlabs.io/v1".to_string(),
            api_key: String::new(),
            model: "eleven_multilingual_v2".to_string(),
            format: AudioFormat::Mp3,
            stability: 0.5,
            similarity_boost: 0.75,
            max_concurrent_requests: 4,
            timeout_secs: 60,
        }
    }
}

/// Where generated audio is written and served from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub files_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            files_dir: PathBuf::from("files"),
        }
    }
}

/// Prompt templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub script_template: String,
    pub default_style: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            script_template: DEFAULT_SCRIPT_PROMPT.to_string(),
            default_style: "Conversational".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PodcastError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| PodcastError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, PodcastError> {
        toml::from_str(content)
            .map_err(|e| PodcastError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))
        };

        if let Some(key) = get(&["SCRIPT_API_KEY", "GEMINI_API_KEY"]) {
            self.script.api_key = key;
        }
        if let Some(base) = get(&["SCRIPT_API_BASE"]) {
            self.script.api_base = base;
        }
        if let Some(key) = get(&["SPEECH_API_KEY", "ELEVENLABS_API_KEY"]) {
            self.speech.api_key = key;
        }
        if let Some(base) = get(&["SPEECH_API_BASE"]) {
            self.speech.api_base = base;
        }
        if let Some(dir) = get(&["FILES_DIR"]) {
            self.storage.files_dir = PathBuf::from(dir);
        }
        if let Some(port) = get(&["SERVER_PORT"]).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PodcastError> {
        if self.script.timeout_secs == 0 || self.speech.timeout_secs == 0 {
            return Err(PodcastError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.speech.max_concurrent_requests == 0 {
            return Err(PodcastError::Config(
                "speech.max_concurrent_requests must be greater than zero".to_string(),
            ));
        }
        if self.script.min_presenters < 2 {
            return Err(PodcastError::Config(
                "script.min_presenters must be at least 2".to_string(),
            ));
        }
        if self.speech.provider == SpeechProviderKind::ElevenLabs
            && self.speech.format != AudioFormat::Mp3
        {
            return Err(PodcastError::Config(
                "the elevenlabs provider only produces mp3".to_string(),
            ));
        }
        if !self.prompts.script_template.contains("{transcription}") {
            return Err(PodcastError::Config(
                "prompts.script_template must contain {transcription}".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the script prompt for a request.
    pub fn render_script_prompt(
        &self,
        transcription: &str,
        style: &str,
        presenter_names: &[&str],
        presenter_profiles: &[String],
    ) -> String {
        let first = presenter_names.first().copied().unwrap_or("Host");
        let second = presenter_names.get(1).copied().unwrap_or("Guest");
        let profiles = presenter_profiles
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n");

        self.prompts
            .script_template
            .replace("{presenter_names}", &presenter_names.join(", "))
            .replace("{presenter_profiles}", &profiles)
            .replace("{style}", style)
            .replace("{first_speaker}", first)
            .replace("{second_speaker}", second)
            .replace("{transcription}", transcription)
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        server: ServerConfig::default(),
        script: ScriptConfig::default(),
        speech: SpeechConfig::default(),
        storage: StorageConfig::default(),
        prompts: PromptsConfig::default(),
    }
}

const DEFAULT_SCRIPT_PROMPT: &str = r#"You are an expert podcast scriptwriter.
Turn the transcription below into a lively, conversational podcast script.

PRESENTERS: {presenter_names}
{presenter_profiles}

PODCAST STYLE: {style}

STRICT OUTPUT RULES:
- The output MUST be a single valid JSON object and nothing else.
- The object has two keys: "title" (a short episode title) and "script".
- "script" is a list of objects, each with the keys "speaker" and "line".
- "speaker" MUST be exactly one of the presenter names.
- Presenters take turns; keep each presenter true to their personality.
- "line" is the spoken dialogue only: no stage directions, no markdown.
- Do not add any text, explanation or code fences outside the JSON.

EXAMPLE OUTPUT:
{
  "title": "Episode title",
  "script": [
    { "speaker": "{first_speaker}", "line": "Welcome to the show." },
    { "speaker": "{second_speaker}", "line": "Today we explore a fascinating topic." }
  ]
}

ORIGINAL TRANSCRIPTION:
---
{transcription}
---
"#;
