//! `AppState` - the shop's domain container.
//!
//! Holds the catalog, the order draft (checkout fields plus basket), the
//! current validation errors and the preview selection. Collaborators call
//! its operations; it mutates its own fields and announces the result on
//! the bus. It never references a view.
//!
//! All fields sit behind one lock that is always released before an event
//! is emitted, so handlers may read or mutate the state re-entrantly.

use std::collections::HashSet;

use larek_core::{
    CatalogItem, FormErrors, ItemId, OrderDraft, OrderField, OrderPhase, OrderRequest, Price,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::bus::EventBus;
use crate::error::{Result, StateError};
use crate::events::{
    BASKET_REMOVED, BASKET_UPDATED, CATALOG_CHANGED, FORM_ERRORS_CHANGED, ORDER_READY,
    PREVIEW_CHANGED, StateSnapshot,
};
use crate::model::{Model, ReactiveModel};

#[derive(Debug)]
struct StateInner {
    catalog: Vec<Model<CatalogItem>>,
    order: Model<OrderDraft>,
    preview: Option<ItemId>,
    form_errors: FormErrors,
    phase: OrderPhase,
}

/// Reactive application state.
#[derive(Debug)]
pub struct AppState {
    bus: EventBus,
    inner: Mutex<StateInner>,
}

impl AppState {
    /// Create an empty state publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        let order = Model::from_data(OrderDraft::default(), bus.clone());
        Self::with_order(order, bus)
    }

    /// Create a state whose draft starts from `partial` fields (e.g. a
    /// restored checkout form) merged over an empty draft.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Model`] if `partial` is not a valid draft.
    pub fn with_draft(partial: Value, bus: EventBus) -> Result<Self> {
        let order = Model::new(partial, bus.clone())?;
        Ok(Self::with_order(order, bus))
    }

    fn with_order(order: Model<OrderDraft>, bus: EventBus) -> Self {
        Self {
            bus,
            inner: Mutex::new(StateInner {
                catalog: Vec::new(),
                order,
                preview: None,
                form_errors: FormErrors::default(),
                phase: OrderPhase::default(),
            }),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replace the whole catalog and emit `catalog:changed`.
    ///
    /// Every raw item is built before anything is swapped, so a failure
    /// leaves the previous catalog untouched. The basket is not pruned;
    /// ids that disappear simply stop resolving.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Model`] for an item that does not form a
    /// valid [`CatalogItem`], [`StateError::MissingItemId`] for an item with
    /// an empty or absent id, [`StateError::DuplicateItem`] if an id repeats,
    /// or a dispatch error from a subscriber.
    pub fn load_catalog<I, R>(&self, raw_items: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Serialize,
    {
        let mut seen = HashSet::new();
        let mut catalog = Vec::new();
        for (position, raw) in raw_items.into_iter().enumerate() {
            let item: Model<CatalogItem> = Model::new(serde_json::to_value(raw)?, self.bus.clone())?;
            if item.id.as_str().is_empty() {
                return Err(StateError::MissingItemId { position });
            }
            if !seen.insert(item.id.clone()) {
                return Err(StateError::DuplicateItem(item.id.clone()));
            }
            catalog.push(item);
        }

        let snapshot: Vec<CatalogItem> = catalog.iter().map(|item| item.data().clone()).collect();
        self.inner.lock().catalog = catalog;
        debug!(items = snapshot.len(), "catalog replaced");

        self.emit_changes(CATALOG_CHANGED, keyed("catalog", &snapshot)?)
    }

    /// Copy of the current catalog.
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogItem> {
        self.inner
            .lock()
            .catalog
            .iter()
            .map(|item| item.data().clone())
            .collect()
    }

    /// Look up one catalog item.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<CatalogItem> {
        self.inner
            .lock()
            .catalog
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.data().clone())
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Show `item` in detail, or close the preview with `None`.
    ///
    /// Emits `preview:changed` with the item snapshot, or `null` when
    /// closing.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error from a subscriber.
    pub fn select_preview(&self, item: Option<&CatalogItem>) -> Result<()> {
        self.inner.lock().preview = item.map(|item| item.id.clone());

        match item {
            Some(item) => {
                debug!(item = %item.id, "preview selected");
                Model::from_data(item.clone(), self.bus.clone())
                    .emit_changes(PREVIEW_CHANGED, Value::Null)
            }
            None => {
                debug!("preview cleared");
                self.bus.emit(PREVIEW_CHANGED, Value::Null)?;
                Ok(())
            }
        }
    }

    /// Preview the catalog item with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownItem`] if `id` is not in the catalog, or
    /// a dispatch error from a subscriber.
    pub fn select_preview_by_id(&self, id: &ItemId) -> Result<()> {
        let item = self
            .item(id)
            .ok_or_else(|| StateError::UnknownItem(id.clone()))?;
        self.select_preview(Some(&item))
    }

    /// Id of the previewed item.
    #[must_use]
    pub fn preview(&self) -> Option<ItemId> {
        self.inner.lock().preview.clone()
    }

    // =========================================================================
    // Checkout form
    // =========================================================================

    /// Set one draft field, revalidate, and resynchronise the error display.
    ///
    /// Always emits `formErrors:changed`; additionally emits `order:ready`
    /// with the draft when it is now valid. Returns the validity.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error from a subscriber.
    pub fn set_order_field(&self, field: OrderField, value: impl Into<String>) -> Result<bool> {
        self.inner.lock().order.data_mut().set(field, value);
        let valid = self.validate_order();
        debug!(%field, valid, "order field updated");

        let errors = self.form_errors();
        self.emit_changes(FORM_ERRORS_CHANGED, keyed("errors", &errors)?)?;

        if valid {
            let draft = self.inner.lock().order.clone();
            draft.emit_changes(ORDER_READY, Value::Null)?;
        }
        Ok(valid)
    }

    /// [`AppState::set_order_field`] addressed by field name.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidField`] for a name outside the order
    /// field set, or a dispatch error from a subscriber.
    pub fn set_order_field_by_name(&self, field: &str, value: impl Into<String>) -> Result<bool> {
        let field: OrderField = field.parse()?;
        self.set_order_field(field, value)
    }

    /// Rebuild the validation errors from scratch and report validity.
    ///
    /// Does not emit.
    pub fn validate_order(&self) -> bool {
        let mut inner = self.inner.lock();
        let errors = inner.order.validate();
        let valid = errors.is_valid();
        inner.form_errors = errors;
        inner.phase = OrderPhase::from_validity(valid);
        valid
    }

    /// Forget the current validation errors (a freshly opened form).
    pub fn reset_form_errors(&self) {
        let mut inner = self.inner.lock();
        inner.form_errors = FormErrors::default();
        inner.phase = OrderPhase::Editing;
    }

    /// Copy of the current validation errors.
    #[must_use]
    pub fn form_errors(&self) -> FormErrors {
        self.inner.lock().form_errors.clone()
    }

    /// Editing/valid phase of the draft.
    #[must_use]
    pub fn order_phase(&self) -> OrderPhase {
        self.inner.lock().phase
    }

    /// Copy of the order draft.
    #[must_use]
    pub fn order(&self) -> OrderDraft {
        self.inner.lock().order.data().clone()
    }

    /// Submission body for the current draft and basket total.
    #[must_use]
    pub fn order_request(&self) -> OrderRequest {
        OrderRequest::from_draft(self.order(), self.basket_total())
    }

    // =========================================================================
    // Basket
    // =========================================================================

    /// Include or exclude `id` from the basket without emitting.
    ///
    /// Adding an id already present, or removing one that is absent, is a
    /// no-op. New ids go to the end.
    pub fn toggle_basket_item(&self, id: &ItemId, included: bool) {
        let mut inner = self.inner.lock();
        let items = &mut inner.order.data_mut().items;
        if included {
            if !items.contains(id) {
                items.push(id.clone());
            }
        } else {
            items.retain(|existing| existing != id);
        }
    }

    /// Add `id` and emit `basket:updated`.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error from a subscriber.
    pub fn add_to_basket(&self, id: &ItemId) -> Result<()> {
        self.toggle_basket_item(id, true);
        debug!(item = %id, "added to basket");
        self.emit_changes(BASKET_UPDATED, keyed("items", &self.basket())?)
    }

    /// Remove `id` and emit `basket:removed`.
    ///
    /// # Errors
    ///
    /// Returns a dispatch error from a subscriber.
    pub fn remove_from_basket(&self, id: &ItemId) -> Result<()> {
        self.toggle_basket_item(id, false);
        debug!(item = %id, "removed from basket");
        self.emit_changes(BASKET_REMOVED, keyed("items", &self.basket())?)
    }

    /// Empty the basket, keeping the checkout fields. Does not emit.
    pub fn clear_basket(&self) {
        self.inner.lock().order.data_mut().items.clear();
    }

    /// Number of ids in the basket, resolvable or not.
    #[must_use]
    pub fn basket_count(&self) -> usize {
        self.inner.lock().order.items.len()
    }

    /// Copy of the basket id sequence.
    #[must_use]
    pub fn basket(&self) -> Vec<ItemId> {
        self.inner.lock().order.items.clone()
    }

    /// Basket entries resolved through the current catalog, in basket
    /// order. Ids missing from the catalog are skipped here but stay in the
    /// basket.
    #[must_use]
    pub fn resolved_basket_items(&self) -> Vec<CatalogItem> {
        let inner = self.inner.lock();
        inner
            .order
            .items
            .iter()
            .filter_map(|id| inner.catalog.iter().find(|item| &item.id == id))
            .map(|item| item.data().clone())
            .collect()
    }

    /// Sum of the known prices of [`AppState::resolved_basket_items`].
    #[must_use]
    pub fn basket_total(&self) -> Price {
        Price::sum_known(self.resolved_basket_items().iter().map(|item| item.price))
    }
}

impl AppState {
    /// Basket size and preview selection, as merged into state events.
    #[must_use]
    pub fn state_snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock();
        StateSnapshot {
            basket_count: inner.order.items.len(),
            preview: inner.preview.clone(),
        }
    }
}

impl ReactiveModel for AppState {
    fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn snapshot(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.state_snapshot())?)
    }
}

/// A one-key JSON object.
fn keyed(key: &str, value: &impl Serialize) -> Result<Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(map))
}
