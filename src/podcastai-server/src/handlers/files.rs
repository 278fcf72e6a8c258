use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use podcastai_core::AudioFormat;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::state::AppState;

/// Stream back a previously generated audio file.
#[tracing::instrument(skip_all, fields(filename = %filename))]
pub async fn file_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, len) = state.orchestrator.store().open(&filename).await?;

    let content_type = AudioFormat::from_path(&filename)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");

    tracing::debug!(bytes = len, "Streaming audio file");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
