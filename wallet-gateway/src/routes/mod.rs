pub mod health;
pub mod products;
pub mod transactions;
pub mod wallet;

use axum::http::StatusCode;

/// Error shape shared by all handlers.
pub type ApiError = (StatusCode, String);

pub(crate) fn bad_request(msg: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.to_string())
}

pub(crate) fn internal(msg: impl std::fmt::Display) -> ApiError {
    tracing::error!("request failed: {msg}");
    (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
}
