// wallet-gateway/src/main.rs

//! Wallet gateway binary.
//!
//! This binary runs the process-wide wallet watcher and exposes a small HTTP
//! API on top of the `wallet` crate:
//!
//! - `GET /health`
//! - `GET /wallet`
//! - `GET | POST /transactions`, `DELETE /transactions/{hash}`
//! - `PUT | GET | PATCH /products/{id}`
//! - `POST /products/{id}/apply`, `DELETE /products/{id}/pending`
//! - `POST /products/{id}/state`
//!
//! Pending transactions are kept in RocksDB; metrics are exported by a
//! Prometheus exporter on `/metrics`.

mod config;
mod events;
mod routes;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tokio::signal;

use wallet::{
    HttpWalletProvider, MetricsRegistry, PendingTransactionStore, RocksDbPendingStore,
    WalletConfig, WalletProvider, run_prometheus_http_server, watcher,
};
use config::ApiConfig;
use routes::{health, products, transactions};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "wallet_gateway=info,wallet=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::from_env().map_err(|e| e.to_string())?;
    let wallet_cfg = WalletConfig::from_env().map_err(|e| e.to_string())?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if wallet_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = wallet_cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Pending store + provider
    // ---------------------------

    let store: Arc<dyn PendingTransactionStore> = Arc::new(
        RocksDbPendingStore::open(&wallet_cfg.pending_store).map_err(|e| {
            format!(
                "failed to open RocksDB store at {}: {e}",
                wallet_cfg.pending_store.path
            )
        })?,
    );

    let provider: Arc<dyn WalletProvider> = Arc::new(
        HttpWalletProvider::from_config(&wallet_cfg.provider)
            .map_err(|e| format!("failed to create HttpWalletProvider: {e}"))?,
    );

    // ---------------------------
    // Wallet watcher
    // ---------------------------

    // Handlers are registered first so no event of the first tick is missed.
    let subscriptions = events::register(store.clone());
    tracing::debug!(count = subscriptions.len(), "watcher handlers registered");

    watcher::start(
        wallet_cfg.watcher.clone(),
        provider,
        store.clone(),
        Some(metrics.watcher.clone()),
    )
    .map_err(|e| format!("failed to start wallet watcher: {e}"))?;

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app_state: SharedState = Arc::new(AppState::new(store));

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/wallet", get(routes::wallet::current_wallet))
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::track_transaction),
        )
        .route(
            "/transactions/{hash}",
            delete(transactions::forget_transaction),
        )
        .route(
            "/products/{id}",
            put(products::put_product)
                .get(products::get_product)
                .patch(products::patch_product),
        )
        .route("/products/{id}/apply", post(products::apply_changes))
        .route("/products/{id}/pending", delete(products::discard_changes))
        .route("/products/{id}/state", post(products::transition_product))
        .with_state(app_state);

    tracing::info!("wallet gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    for (kind, id) in subscriptions {
        watcher::unsubscribe(kind, id);
    }

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
