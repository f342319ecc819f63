use axum::{Json, http::StatusCode};

use wallet::WatcherSnapshot;

use super::ApiError;

/// `GET /wallet`
///
/// Current account and network as last seen by the watcher.
pub async fn current_wallet() -> Result<Json<WatcherSnapshot>, ApiError> {
    wallet::watcher::snapshot().map(Json).ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "wallet watcher is not running".to_string(),
    ))
}
