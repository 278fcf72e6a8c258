use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use podcastai_core::{AudioOutput, AudioRequest, GeneratedAudio, PodcastRequest, Script, ScriptLine};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

/// Episode script plus the audio fields; `status` comes from the flattened audio part.
#[derive(Debug, Serialize)]
pub struct PodcastResponse {
    pub title: String,
    pub script: Vec<ScriptLine>,
    #[serde(flatten)]
    pub audio: AudioResponse,
}

#[tracing::instrument(skip_all)]
pub async fn generate_script_handler(
    State(state): State<AppState>,
    payload: Result<Json<PodcastRequest>, JsonRejection>,
) -> Result<Json<Script>, ApiError> {
    let Json(request) = payload?;

    let script = state.orchestrator.script_only(&request).await?;

    tracing::info!(title = %script.title, lines = script.lines.len(), "Script request served");
    Ok(Json(script))
}

#[tracing::instrument(skip_all)]
pub async fn generate_podcast_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PodcastRequest>, JsonRejection>,
) -> Result<Json<PodcastResponse>, ApiError> {
    let Json(request) = payload?;

    let episode = state.orchestrator.full_podcast(&request).await?;
    let audio = audio_response(&state, &headers, &episode.audio);

    Ok(Json(PodcastResponse {
        title: episode.script.title,
        script: episode.script.lines,
        audio,
    }))
}

#[tracing::instrument(skip_all)]
pub async fn generate_audio_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AudioRequest>, JsonRejection>,
) -> Result<Json<AudioResponse>, ApiError> {
    let Json(request) = payload?;

    let audio = state.orchestrator.audio_from_script(&request).await?;

    Ok(Json(audio_response(&state, &headers, &audio)))
}

fn audio_response(state: &AppState, headers: &HeaderMap, audio: &GeneratedAudio) -> AudioResponse {
    match &audio.output {
        AudioOutput::File { filename } => AudioResponse {
            status: "success".to_string(),
            audio_file_url: Some(file_url(state, headers, filename)),
            audio_base64: None,
        },
        AudioOutput::Base64(data) => AudioResponse {
            status: "success".to_string(),
            audio_file_url: None,
            audio_base64: Some(data.clone()),
        },
    }
}

/// Absolute URL of a stored file: the configured public URL, else the request host.
fn file_url(state: &AppState, headers: &HeaderMap, filename: &str) -> String {
    let base = match &state.config.server.public_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .map(|host| format!("http://{}", host))
            .unwrap_or_default(),
    };

    format!("{}/files/{}", base, filename)
}
