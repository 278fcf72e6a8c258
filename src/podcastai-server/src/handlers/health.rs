use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness only; providers are not contacted.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub health_url: String,
}

pub async fn root_handler() -> impl IntoResponse {
    Json(RootResponse {
        message: "Welcome to the PodcastAI generator API!".to_string(),
        health_url: "/health".to_string(),
    })
}
