//! Product editing endpoints.
//!
//! Edits go through `wallet::product::update`, so a published product keeps
//! its live fields and collects the edits in `pendingChanges` until
//! `POST /products/{id}/apply`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use wallet::product::{self, Fields, Product, ProductState};

use super::{ApiError, bad_request};
use crate::state::SharedState;

/// Keys that are part of the product envelope rather than its fields.
const RESERVED_KEYS: [&str; 3] = ["id", "state", "pendingChanges"];

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// `pending` returns the product with staged changes overlaid.
    pub view: Option<String>,
}

/// Request body for `POST /products/{id}/state`.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub state: ProductState,
}

fn not_found(id: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("product {id} not found"))
}

/// `PUT /products/{id}`
///
/// Creates or replaces a product as is. The path id wins over a missing
/// body id; a conflicting body id is rejected.
pub async fn put_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(mut body): Json<Product>,
) -> Result<Json<Product>, ApiError> {
    match body.id.as_deref() {
        Some(body_id) if body_id != id => {
            return Err(bad_request(format!(
                "body id {body_id:?} does not match path id {id:?}"
            )));
        }
        _ => body.id = Some(id.clone()),
    }

    state.products.lock().await.put(id, body.clone());
    Ok(Json(body))
}

/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Product>, ApiError> {
    let catalog = state.products.lock().await;
    let current = catalog.get(&id).ok_or_else(|| not_found(&id))?;

    match query.view.as_deref() {
        None | Some("live") => Ok(Json(current.clone())),
        Some("pending") => Ok(Json(product::with_pending_changes(current))),
        Some(other) => Err(bad_request(format!("unknown view {other:?}"))),
    }
}

/// `PATCH /products/{id}`
///
/// The body is an object of field edits; `null` removes a field. Published
/// products stage the edits instead of applying them.
pub async fn patch_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(edits): Json<Fields>,
) -> Result<Json<Product>, ApiError> {
    if let Some(key) = edits.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
        return Err(bad_request(format!("field {key:?} cannot be edited")));
    }

    let mut catalog = state.products.lock().await;
    let current = catalog.get(&id).ok_or_else(|| not_found(&id))?;

    let next = product::update(current, |p| {
        let mut candidate = p.clone();
        for (name, value) in &edits {
            if value.is_null() {
                candidate.fields.remove(name);
            } else {
                candidate.set_field(name.clone(), value.clone());
            }
        }
        candidate
    });

    tracing::debug!(
        product = %id,
        staged = product::get_pending_changes(&next).len(),
        "product edited"
    );
    catalog.put(id, next.clone());
    Ok(Json(next))
}

/// `POST /products/{id}/apply`
pub async fn apply_changes(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let mut catalog = state.products.lock().await;
    let current = catalog.get(&id).ok_or_else(|| not_found(&id))?;

    let next = product::apply_pending_changes(current);
    catalog.put(id, next.clone());
    Ok(Json(next))
}

/// `DELETE /products/{id}/pending`
pub async fn discard_changes(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let mut catalog = state.products.lock().await;
    let current = catalog.get(&id).ok_or_else(|| not_found(&id))?;

    let next = product::discard_pending_changes(current);
    catalog.put(id, next.clone());
    Ok(Json(next))
}

/// `POST /products/{id}/state`
pub async fn transition_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<Product>, ApiError> {
    let mut catalog = state.products.lock().await;
    let current = catalog.get(&id).ok_or_else(|| not_found(&id))?;

    let next = product::transition(current, body.state)
        .map_err(|e| (StatusCode::CONFLICT, e.to_string()))?;
    tracing::info!(product = %id, state = %body.state, "product state changed");
    catalog.put(id, next.clone());
    Ok(Json(next))
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

    async fn seed(state: &SharedState, product_state: ProductState) {
        let body = Product {
            id: None,
            ..Product::new("1", product_state).with_field("name", "A")
        };
        put_product(State(state.clone()), Path("1".to_string()), Json(body))
            .await
            .expect("stored");
    }

    fn edits(value: serde_json::Value) -> Json<Fields> {
        match value {
            serde_json::Value::Object(map) => Json(map),
            _ => panic!("edits must be an object"),
        }
    }

    #[tokio::test]
    async fn patch_on_published_product_is_staged() {
        let state = state();
        seed(&state, ProductState::Deployed).await;

        let Json(next) = patch_product(
            State(state.clone()),
            Path("1".to_string()),
            edits(json!({ "name": "B" })),
        )
        .await
        .expect("patched");
        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            json!({ "id": "1", "name": "A", "state": "DEPLOYED", "pendingChanges": { "name": "B" } })
        );

        let Json(view) = get_product(
            State(state.clone()),
            Path("1".to_string()),
            Query(ProductQuery {
                view: Some("pending".to_string()),
            }),
        )
        .await
        .expect("view");
        assert_eq!(view.field("name"), Some(&json!("B")));

        let Json(applied) = apply_changes(State(state), Path("1".to_string()))
            .await
            .expect("applied");
        assert_eq!(applied.field("name"), Some(&json!("B")));
        assert!(applied.pending_changes.is_none());
    }

    #[tokio::test]
    async fn patch_on_draft_edits_directly_and_null_removes() {
        let state = state();
        seed(&state, ProductState::NotDeployed).await;

        let Json(next) = patch_product(
            State(state),
            Path("1".to_string()),
            edits(json!({ "name": null, "price": 3 })),
        )
        .await
        .expect("patched");
        assert!(next.field("name").is_none());
        assert_eq!(next.field("price"), Some(&json!(3)));
        assert!(next.pending_changes.is_none());
    }

    #[tokio::test]
    async fn envelope_keys_are_not_editable() {
        let state = state();
        seed(&state, ProductState::Deployed).await;

        let err = patch_product(
            State(state),
            Path("1".to_string()),
            edits(json!({ "state": "NOT_DEPLOYED" })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_transition_is_a_conflict() {
        let state = state();
        seed(&state, ProductState::NotDeployed).await;

        let err = transition_product(
            State(state.clone()),
            Path("1".to_string()),
            Json(TransitionRequest {
                state: ProductState::Deployed,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);

        let Json(next) = transition_product(
            State(state),
            Path("1".to_string()),
            Json(TransitionRequest {
                state: ProductState::Deploying,
            }),
        )
        .await
        .expect("deploying");
        assert_eq!(next.state, Some(ProductState::Deploying));
    }

    #[tokio::test]
    async fn mismatched_body_id_and_missing_product() {
        let state = state();
        let err = put_product(
            State(state.clone()),
            Path("1".to_string()),
            Json(Product::new("2", ProductState::NotDeployed)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let err = get_product(State(state), Path("9".to_string()), Query(ProductQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
