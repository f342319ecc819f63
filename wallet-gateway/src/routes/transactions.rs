use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wallet::{PendingTxRecord, TxHash};

use super::{ApiError, bad_request, internal};
use crate::state::SharedState;

/// Request body for `POST /transactions`.
#[derive(Debug, Deserialize)]
pub struct TrackTransactionRequest {
    /// `0x`-prefixed transaction hash as returned by the wallet.
    pub hash: String,
    /// Free-form context shown alongside the transaction.
    #[serde(default)]
    pub metadata: Value,
}

/// One tracked transaction.
#[derive(Debug, Serialize)]
pub struct TrackedTransaction {
    pub hash: TxHash,
    #[serde(flatten)]
    pub record: PendingTxRecord,
}

/// `GET /transactions`
pub async fn list_transactions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TrackedTransaction>>, ApiError> {
    let txs = state.store.transactions().map_err(internal)?;
    Ok(Json(
        txs.into_iter()
            .map(|(hash, record)| TrackedTransaction { hash, record })
            .collect(),
    ))
}

/// `POST /transactions`
///
/// Starts tracking a submitted transaction. The watcher reports its outcome
/// on a later pending-transaction tick.
pub async fn track_transaction(
    State(state): State<SharedState>,
    Json(body): Json<TrackTransactionRequest>,
) -> Result<(StatusCode, Json<TrackedTransaction>), ApiError> {
    let hash = TxHash::parse(&body.hash).map_err(bad_request)?;
    let record = PendingTxRecord::now(body.metadata);

    state
        .store
        .add(hash.clone(), record.clone())
        .map_err(internal)?;
    tracing::info!(%hash, "tracking transaction");

    Ok((StatusCode::CREATED, Json(TrackedTransaction { hash, record })))
}

/// `DELETE /transactions/{hash}`
pub async fn forget_transaction(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<StatusCode, ApiError> {
    let hash = TxHash::parse(&hash).map_err(bad_request)?;
    if state.store.remove(&hash).map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("transaction {hash} is not tracked")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use serde_json::json;
    use std::sync::Arc;
    use wallet::InMemoryPendingStore;

    fn state() -> SharedState {
        Arc::new(AppState::new(Arc::new(InMemoryPendingStore::new())))
    }

    fn hash_hex() -> String {
        format!("0x{}", "ab".repeat(32))
    }

    #[tokio::test]
    async fn tracked_transaction_is_listed_and_forgotten() {
        let state = state();
        let (status, Json(tracked)) = track_transaction(
            State(state.clone()),
            Json(TrackTransactionRequest {
                hash: hash_hex().to_uppercase().replacen("0X", "0x", 1),
                metadata: json!({ "product": "1" }),
            }),
        )
        .await
        .expect("tracked");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tracked.hash.as_str(), hash_hex());

        let Json(listed) = list_transactions(State(state.clone())).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record.metadata, json!({ "product": "1" }));

        let status = forget_transaction(State(state.clone()), Path(hash_hex()))
            .await
            .expect("removed");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = forget_transaction(State(state), Path(hash_hex()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_hash_is_rejected() {
        let err = track_transaction(
            State(state()),
            Json(TrackTransactionRequest {
                hash: "0x1234".to_string(),
                metadata: Value::Null,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
