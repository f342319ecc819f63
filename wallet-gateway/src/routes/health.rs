use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Simple health-check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub watcher_started: bool,
}

/// `GET /health`
///
/// Returns liveness plus whether the wallet watcher is running.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            watcher_started: wallet::watcher::is_started(),
        }),
    )
}
