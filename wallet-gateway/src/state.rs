//! Shared application state and the product catalog.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use wallet::{PendingTransactionStore, Product};

/// In-memory product catalog keyed by product id.
///
/// HTTP handlers read a product, run it through the `wallet::product`
/// functions and write the result back.
#[derive(Default)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Inserts or replaces the product stored under `id`.
    pub fn put(&mut self, id: String, product: Product) {
        self.products.insert(id, product);
    }
}

/// Shared state held by the API and the watcher event handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Transactions submitted through this gateway and not yet settled.
    pub store: Arc<dyn PendingTransactionStore>,
    /// Products edited through the API.
    pub products: Mutex<ProductCatalog>,
}

impl AppState {
    pub fn new(store: Arc<dyn PendingTransactionStore>) -> Self {
        Self {
            store,
            products: Mutex::new(ProductCatalog::new()),
        }
    }
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
