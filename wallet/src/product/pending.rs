//! Pending-changes operations on [`Product`].
//!
//! Diffing is shallow: each top-level field is compared as a whole
//! [`serde_json::Value`]. Nested objects are never merged; an edit inside a
//! nested object stages the whole new object.

use serde_json::Value;

use super::{Fields, Product, ProductError, ProductState};

/// `true` iff the product is deploying or deployed.
///
/// A missing product or a product without a state is not published.
pub fn is_published(product: Option<&Product>) -> bool {
    product.is_some_and(Product::is_published)
}

/// Applies `updater` to `product`, staging the result if it is published.
///
/// The updater receives the whole current product (including staged
/// changes) and returns the full next product. For an unpublished product
/// that result is returned as is. For a published one, the live fields are
/// kept and every field that differs in the result is merged into
/// `pending_changes`; a field the updater removed is staged as `null`.
pub fn update<F>(product: &Product, updater: F) -> Product
where
    F: FnOnce(&Product) -> Product,
{
    let candidate = updater(product);
    if !product.is_published() {
        return candidate;
    }

    let mut staged = product.pending_changes.clone().unwrap_or_default();
    for (name, value) in &candidate.fields {
        if product.fields.get(name) != Some(value) {
            staged.insert(name.clone(), value.clone());
        }
    }
    for name in product.fields.keys() {
        if !candidate.fields.contains_key(name) {
            staged.insert(name.clone(), Value::Null);
        }
    }

    let mut next = product.clone();
    if !staged.is_empty() {
        next.pending_changes = Some(staged);
    }
    next
}

/// Staged changes of a published product, or an empty map.
pub fn get_pending_changes(product: &Product) -> Fields {
    if !product.is_published() {
        return Fields::new();
    }
    product.pending_changes.clone().unwrap_or_default()
}

/// `true` if `field` has a staged change.
pub fn has_pending_change(product: &Product, field: &str) -> bool {
    product.is_published()
        && product
            .pending_changes
            .as_ref()
            .is_some_and(|p| p.contains_key(field))
}

/// The product as it will look once staged changes are applied.
///
/// Read-only projection: `pending_changes` is kept. A staged `null` hides
/// the field.
pub fn with_pending_changes(product: &Product) -> Product {
    let mut view = product.clone();
    if let Some(staged) = &product.pending_changes {
        overlay(&mut view.fields, staged);
    }
    view
}

/// Merges staged changes into the live fields and clears them.
pub fn apply_pending_changes(product: &Product) -> Product {
    let mut next = product.clone();
    if let Some(staged) = next.pending_changes.take() {
        overlay(&mut next.fields, &staged);
    }
    next
}

/// Drops staged changes, keeping the live fields.
pub fn discard_pending_changes(product: &Product) -> Product {
    let mut next = product.clone();
    next.pending_changes = None;
    next
}

/// Moves the product one step along its lifecycle.
///
/// A product without a state counts as [`ProductState::NotDeployed`].
/// Leaving the published states discards staged changes.
pub fn transition(product: &Product, to: ProductState) -> Result<Product, ProductError> {
    let from = product.state.unwrap_or(ProductState::NotDeployed);
    if !from.can_transition_to(to) {
        return Err(ProductError::InvalidTransition { from, to });
    }

    let mut next = product.clone();
    next.state = Some(to);
    if from.is_published() && !to.is_published() {
        next.pending_changes = None;
    }
    Ok(next)
}

/// Writes staged values over `fields`; a staged `null` removes the field.
fn overlay(fields: &mut Fields, staged: &Fields) {
    for (name, value) in staged {
        if value.is_null() {
            fields.remove(name);
        } else {
            fields.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(state: ProductState) -> Product {
        Product::new("1", state)
            .with_field("name", "My Product")
            .with_field("description", "My nice product")
    }

    fn rename(p: &Product) -> Product {
        let mut next = p.clone();
        next.set_field("name", "Better Name");
        next.set_field("description", "A better description");
        next
    }

    #[test]
    fn detects_published_state() {
        assert!(is_published(Some(&product(ProductState::Deployed))));
        assert!(is_published(Some(&product(ProductState::Deploying))));
        assert!(!is_published(Some(&product(ProductState::NotDeployed))));
        assert!(!is_published(Some(&product(ProductState::Undeploying))));
    }

    #[test]
    fn detects_published_state_for_empty_product() {
        assert!(!is_published(None));
        assert!(!is_published(Some(&Product::default())));
        let deployed = Product {
            state: Some(ProductState::Deployed),
            ..Product::default()
        };
        assert!(is_published(Some(&deployed)));
    }

    #[test]
    fn updates_unpublished_product_directly() {
        for state in [ProductState::NotDeployed, ProductState::Undeploying] {
            let p = product(state);
            let next = update(&p, rename);

            assert_eq!(next, rename(&p));
            assert!(next.pending_changes.is_none());
            assert!(get_pending_changes(&next).is_empty());
        }
    }

    #[test]
    fn stages_updates_for_published_product() {
        for state in [ProductState::Deployed, ProductState::Deploying] {
            let p = product(state);
            let next = update(&p, rename);

            assert_eq!(next.field("name"), Some(&json!("My Product")));
            assert_eq!(next.field("description"), Some(&json!("My nice product")));
            assert_eq!(next.state, Some(state));
            assert_eq!(
                Value::Object(get_pending_changes(&next)),
                json!({
                    "name": "Better Name",
                    "description": "A better description",
                })
            );
        }
    }

    #[test]
    fn staged_update_matches_documented_example() {
        let p = Product::new("1", ProductState::Deployed).with_field("name", "A");
        let next = update(&p, |p| p.clone().with_field("name", "B"));

        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            json!({
                "id": "1",
                "name": "A",
                "state": "DEPLOYED",
                "pendingChanges": { "name": "B" },
            })
        );
    }

    #[test]
    fn repeated_updates_accumulate() {
        let p = product(ProductState::Deployed);
        let first = update(&p, |p| p.clone().with_field("name", "First"));
        let second = update(&first, |p| p.clone().with_field("name", "Second"));
        let third = update(&second, |p| p.clone().with_field("price", 5));

        let staged = get_pending_changes(&third);
        assert_eq!(staged["name"], json!("Second"));
        assert_eq!(staged["price"], json!(5));
        assert_eq!(staged.len(), 2);
        assert_eq!(third.field("name"), Some(&json!("My Product")));
        assert!(third.field("price").is_none());
    }

    #[test]
    fn removed_field_is_staged_as_null() {
        let p = product(ProductState::Deployed);
        let next = update(&p, |p| {
            let mut n = p.clone();
            n.fields.remove("description");
            n
        });

        assert_eq!(get_pending_changes(&next)["description"], Value::Null);
        assert_eq!(next.field("description"), Some(&json!("My nice product")));
    }

    #[test]
    fn staged_removal_drops_the_field_in_view_and_on_apply() {
        let drop_description = |p: &Product| {
            let mut n = p.clone();
            n.fields.remove("description");
            n
        };
        let p = product(ProductState::Deployed);
        let staged = update(&p, drop_description);

        let view = with_pending_changes(&staged);
        assert_eq!(view.field("description"), None);
        assert_eq!(view.fields, drop_description(&p).fields);

        let applied = apply_pending_changes(&staged);
        assert_eq!(applied.field("description"), None);
        assert_eq!(
            serde_json::to_value(&applied).unwrap(),
            json!({ "id": "1", "name": "My Product", "state": "DEPLOYED" })
        );
    }

    #[test]
    fn id_and_state_are_never_staged() {
        let p = product(ProductState::Deployed);
        let next = update(&p, |p| Product {
            id: Some("other".into()),
            state: Some(ProductState::NotDeployed),
            ..p.clone()
        });

        assert_eq!(next, p);
    }

    #[test]
    fn nested_values_are_compared_whole() {
        let p = product(ProductState::Deployed)
            .with_field("contact", json!({ "email": "a@x", "url": "x.io" }));
        let next = update(&p, |p| {
            p.clone()
                .with_field("contact", json!({ "email": "b@x", "url": "x.io" }))
        });

        assert_eq!(
            get_pending_changes(&next)["contact"],
            json!({ "email": "b@x", "url": "x.io" })
        );
    }

    #[test]
    fn no_op_update_on_published_product_stages_nothing() {
        let p = product(ProductState::Deployed);
        let next = update(&p, Product::clone);
        assert_eq!(next, p);
        assert!(get_pending_changes(&next).is_empty());
    }

    #[test]
    fn has_pending_change_reports_staged_fields_only() {
        let unpublished = update(&product(ProductState::NotDeployed), rename);
        assert!(!has_pending_change(&unpublished, "name"));
        assert!(!has_pending_change(&unpublished, "description"));

        let published = update(&product(ProductState::Deployed), rename);
        assert!(has_pending_change(&published, "name"));
        assert!(has_pending_change(&published, "description"));
        assert!(!has_pending_change(&published, "id"));
    }

    #[test]
    fn with_pending_changes_projects_staged_values() {
        let unpublished = product(ProductState::NotDeployed);
        let view = with_pending_changes(&update(&unpublished, rename));
        assert_eq!(view.field("name"), Some(&json!("Better Name")));
        assert_eq!(view.state, Some(ProductState::NotDeployed));

        let published = product(ProductState::Deployed);
        let staged = update(&published, rename);
        let view = with_pending_changes(&staged);

        assert_eq!(view.id.as_deref(), Some("1"));
        assert_eq!(view.field("name"), Some(&json!("Better Name")));
        assert_eq!(view.field("description"), Some(&json!("A better description")));
        assert_eq!(view.state, Some(ProductState::Deployed));
        // Projection only: staged changes stay and the input is untouched.
        assert_eq!(view.pending_changes, staged.pending_changes);
        assert_eq!(staged.field("name"), Some(&json!("My Product")));
    }

    #[test]
    fn apply_merges_and_clears() {
        let staged = update(&product(ProductState::Deployed), rename);
        let applied = apply_pending_changes(&staged);

        assert_eq!(applied.field("name"), Some(&json!("Better Name")));
        assert!(applied.pending_changes.is_none());
        assert!(!has_pending_change(&applied, "name"));
    }

    #[test]
    fn discard_keeps_live_fields() {
        let staged = update(&product(ProductState::Deployed), rename);
        let discarded = discard_pending_changes(&staged);

        assert_eq!(discarded, product(ProductState::Deployed));
    }

    #[test]
    fn transitions_follow_lifecycle_and_drop_staged_on_unpublish() {
        let p = product(ProductState::NotDeployed);
        let deploying = transition(&p, ProductState::Deploying).unwrap();
        let staged = update(&deploying, rename);
        let deployed = transition(&staged, ProductState::Deployed).unwrap();
        assert!(has_pending_change(&deployed, "name"));

        let undeploying = transition(&deployed, ProductState::Undeploying).unwrap();
        assert!(undeploying.pending_changes.is_none());
        assert_eq!(undeploying.field("name"), Some(&json!("My Product")));

        assert_eq!(
            transition(&undeploying, ProductState::Deployed),
            Err(ProductError::InvalidTransition {
                from: ProductState::Undeploying,
                to: ProductState::Deployed,
            })
        );
    }

    #[test]
    fn stateless_product_transitions_as_not_deployed() {
        let next = transition(&Product::default(), ProductState::Deploying).unwrap();
        assert_eq!(next.state, Some(ProductState::Deploying));
    }
}
