//! Published-product state.
//!
//! Once a product is published (deploying or deployed), edits must not land
//! on its live fields. Instead they are staged in `pendingChanges` until the
//! owner applies them. The functions in [`pending`] give editing code one
//! `update` operation that does the right thing for either lifecycle state.
//!
//! Everything here is pure: inputs are borrowed, results are new values.

pub mod pending;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use pending::{
    apply_pending_changes, discard_pending_changes, get_pending_changes, has_pending_change,
    is_published, transition, update, with_pending_changes,
};

/// Field name -> value mapping used for both live and staged fields.
pub type Fields = Map<String, Value>;

/// Deployment lifecycle of a product.
///
/// `NotDeployed -> Deploying -> Deployed -> Undeploying -> NotDeployed`
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductState {
    NotDeployed,
    Deploying,
    Deployed,
    Undeploying,
}

impl ProductState {
    /// `true` for the states in which edits are staged.
    pub fn is_published(self) -> bool {
        matches!(self, ProductState::Deploying | ProductState::Deployed)
    }

    /// Returns `true` if `next` directly follows `self` in the lifecycle.
    pub fn can_transition_to(self, next: ProductState) -> bool {
        matches!(
            (self, next),
            (ProductState::NotDeployed, ProductState::Deploying)
                | (ProductState::Deploying, ProductState::Deployed)
                | (ProductState::Deployed, ProductState::Undeploying)
                | (ProductState::Undeploying, ProductState::NotDeployed)
        )
    }
}

impl fmt::Display for ProductState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProductState::NotDeployed => "NOT_DEPLOYED",
            ProductState::Deploying => "DEPLOYING",
            ProductState::Deployed => "DEPLOYED",
            ProductState::Undeploying => "UNDEPLOYING",
        };
        f.write_str(s)
    }
}

/// A product as edited by the marketplace.
///
/// `id` and `state` are lifecycle data owned by the backend and are never
/// staged. Every other top-level field lives in `fields`, which flattens
/// into the surrounding JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ProductState>,
    #[serde(
        rename = "pendingChanges",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pending_changes: Option<Fields>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Product {
    pub fn new(id: impl Into<String>, state: ProductState) -> Self {
        Self {
            id: Some(id.into()),
            state: Some(state),
            pending_changes: None,
            fields: Fields::new(),
        }
    }

    /// Builder-style setter for a live field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn is_published(&self) -> bool {
        self.state.is_some_and(ProductState::is_published)
    }
}

/// Errors from lifecycle transitions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("invalid product state transition {from} -> {to}")]
    InvalidTransition { from: ProductState, to: ProductState },
}
