//! Event names and payload shapes.
//!
//! Names follow `<entity>:<verb>`. Raw form edits use
//! `order.<field>:change` and are picked up by a pattern subscription, so a
//! new form field needs no new wiring.
//!
//! State events (emitted by [`AppState`](crate::AppState)):
//!
//! | name | payload |
//! |---|---|
//! | `catalog:changed` | [`CatalogChanged`] |
//! | `preview:changed` | the previewed [`CatalogItem`], or `null` |
//! | `basket:updated` | [`BasketChanged`] |
//! | `basket:removed` | [`BasketChanged`] |
//! | `formErrors:changed` | [`FormErrorsChanged`] |
//! | `order:ready` | the [`OrderDraft`](larek_core::OrderDraft) |
//!
//! Every state event except `preview:changed` and `order:ready` also carries
//! the [`StateSnapshot`] fields.

use larek_core::{CatalogItem, FormErrors, ItemId, OrderField, OrderId, Price};
use serde::{Deserialize, Serialize};

pub const CATALOG_CHANGED: &str = "catalog:changed";
pub const PREVIEW_CHANGED: &str = "preview:changed";
pub const BASKET_UPDATED: &str = "basket:updated";
pub const BASKET_REMOVED: &str = "basket:removed";
pub const FORM_ERRORS_CHANGED: &str = "formErrors:changed";
pub const ORDER_READY: &str = "order:ready";
pub const ORDER_SUBMITTED: &str = "order:submitted";
pub const ORDER_FAILED: &str = "order:failed";

// UI intents, emitted by widgets and handled by the presenter.
pub const CARD_SELECT: &str = "card:select";
pub const PREVIEW_CLOSE: &str = "preview:close";
pub const BASKET_ADD: &str = "basket:add";
pub const BASKET_DELETE: &str = "basket:delete";
pub const ORDER_OPEN: &str = "order:open";

/// Pattern matching every `order.<field>:change` event.
pub const ORDER_FIELD_CHANGE_PATTERN: &str = r"^order\.[A-Za-z_]+:change$";

/// Event name reporting a raw edit of `field`.
#[must_use]
pub fn order_field_change(field: OrderField) -> String {
    format!("order.{field}:change")
}

/// Fields of the application state included in its change events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub basket_count: usize,
    pub preview: Option<ItemId>,
}

/// `catalog:changed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogChanged {
    pub catalog: Vec<CatalogItem>,
    #[serde(flatten)]
    pub state: StateSnapshot,
}

/// `basket:updated` / `basket:removed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketChanged {
    pub items: Vec<ItemId>,
    #[serde(flatten)]
    pub state: StateSnapshot,
}

/// `formErrors:changed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrorsChanged {
    pub errors: FormErrors,
    #[serde(flatten)]
    pub state: StateSnapshot,
}

/// `order.<field>:change` payload.
///
/// `field` stays a string: an unknown name must reach the state and fail
/// there as an invalid argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub value: String,
}

/// Payload of intents that target one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: ItemId,
}

/// `order:submitted` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub id: OrderId,
    pub total: Price,
    #[serde(flatten)]
    pub state: StateSnapshot,
}

/// `order:failed` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailed {
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use regex::Regex;

    use super::*;

    #[test]
    fn test_field_change_names_match_pattern() {
        let pattern = Regex::new(ORDER_FIELD_CHANGE_PATTERN).unwrap();
        for field in OrderField::ALL {
            assert!(pattern.is_match(&order_field_change(field)));
        }
        assert!(!pattern.is_match(ORDER_READY));
        assert!(!pattern.is_match(FORM_ERRORS_CHANGED));
    }

    #[test]
    fn test_order_field_change_name() {
        assert_eq!(order_field_change(OrderField::Email), "order.email:change");
    }
}
