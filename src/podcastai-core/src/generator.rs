//! Script generation through a generative-text provider.

use std::sync::Arc;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

use crate::config::{Config, ScriptConfig};
use crate::error::PodcastError;
use crate::presenter::{Presenter, validate_presenters};
use crate::script::{Script, parse_script};
use crate::tts::http_client;

/// A provider that completes a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PodcastError>;

    fn name(&self) -> &str;
}

const SYSTEM_PROMPT: &str =
    "You write podcast scripts and always answer with a single valid JSON object.";

/// OpenAI-compatible chat completions client (OpenAI, Gemini, Ollama, ...).
pub struct OpenAiTextGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiTextGenerator {
    pub fn new(config: &ScriptConfig) -> Result<Self, PodcastError> {
        let http_client = http_client(config.timeout_secs)?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.api_base.trim_end_matches('/'));

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http_client),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, PodcastError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: SYSTEM_PROMPT.into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: prompt.into(),
                name: None,
            }),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_completion_tokens(self.max_tokens)
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Requesting script");

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| PodcastError::upstream(self.name(), "empty completion"))
    }

    fn name(&self) -> &str {
        "script generator"
    }
}

/// Turns a transcription into a [`Script`].
pub struct ScriptGenerator {
    provider: Arc<dyn TextGenerator>,
    config: Arc<Config>,
}

impl ScriptGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>, config: Arc<Config>) -> Self {
        Self { provider, config }
    }

    /// Style used when a request does not name one.
    pub fn default_style(&self) -> &str {
        &self.config.prompts.default_style
    }

    /// Generate a script for `presenters` from `transcription`.
    ///
    /// Every line of the returned script is spoken by one of `presenters`.
    pub async fn generate_script(
        &self,
        transcription: &str,
        style: &str,
        presenters: &[Presenter],
    ) -> Result<Script, PodcastError> {
        if transcription.trim().is_empty() {
            return Err(PodcastError::Validation(
                "transcription cannot be empty".to_string(),
            ));
        }
        validate_presenters(presenters, self.config.script.min_presenters)?;

        let style = if style.trim().is_empty() {
            self.default_style()
        } else {
            style.trim()
        };
        let names: Vec<&str> = presenters.iter().map(|p| p.name.as_str()).collect();
        let profiles: Vec<String> = presenters.iter().map(Presenter::profile).collect();
        let prompt =
            self.config
                .render_script_prompt(transcription.trim(), style, &names, &profiles);

        tracing::info!(
            provider = self.provider.name(),
            transcription_chars = transcription.len(),
            presenters = presenters.len(),
            style = %style,
            "Generating script"
        );

        let raw = self.provider.generate(&prompt).await.inspect_err(|e| {
            tracing::error!(error = %e, "Script generation failed");
        })?;

        let script = parse_script(&raw, presenters).inspect_err(|e| {
            tracing::warn!(error = %e, response_chars = raw.len(), "Unusable script response");
        })?;

        tracing::info!(title = %script.title, lines = script.lines.len(), "Script generated");
        Ok(script)
    }
}
