//! Presenter wiring between UI intents, the backend and the state.
//!
//! Widgets only emit intent events (`card:select`, `basket:add`,
//! `order.email:change`, ...). [`ShopPresenter::wire`] turns those into
//! [`AppState`] calls. Backend work happens in the async methods, which
//! await the [`ShopApi`] first and then hand the result to the synchronous
//! state, so no state lock or dispatch ever spans an `.await`.

use std::sync::{Arc, Weak};

use larek_core::{ItemId, OrderReceipt};
use larek_state::events::{
    BASKET_ADD, BASKET_DELETE, CARD_SELECT, FORM_ERRORS_CHANGED, FieldChange, ItemRef,
    ORDER_FAILED, ORDER_FIELD_CHANGE_PATTERN, ORDER_OPEN, ORDER_SUBMITTED, OrderFailed,
    OrderSubmitted, PREVIEW_CLOSE,
};
use larek_state::{
    AppState, BusError, EventBus, ReactiveModel, Selector, StateError, SubscriptionId,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::api::ShopApi;
use crate::error::{AppError, Result};

/// Connects intent events and backend calls to one [`AppState`].
pub struct ShopPresenter<A> {
    state: Arc<AppState>,
    bus: EventBus,
    api: A,
}

impl<A: ShopApi> ShopPresenter<A> {
    /// Create a presenter for `state`, publishing on the state's bus.
    pub fn new(state: Arc<AppState>, api: A) -> Self {
        let bus = state.bus().clone();
        Self { state, bus, api }
    }

    /// The state this presenter drives.
    #[must_use]
    pub const fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The bus intents are read from.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The backend collaborator.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Subscribe the intent handlers.
    ///
    /// Handlers hold the state weakly; once the state is dropped they do
    /// nothing. Returns the subscription ids so the caller can detach them.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidPattern`] if the field-change pattern does
    /// not compile.
    pub fn wire(&self) -> std::result::Result<Vec<SubscriptionId>, BusError> {
        let field_changes = Selector::pattern(ORDER_FIELD_CHANGE_PATTERN)?;

        let mut ids = vec![
            self.on_item(CARD_SELECT, AppState::select_preview_by_id),
            self.on_item(BASKET_ADD, AppState::add_to_basket),
            self.on_item(BASKET_DELETE, AppState::remove_from_basket),
        ];

        let state = self.weak_state();
        ids.push(self.bus.subscribe(PREVIEW_CLOSE, move |_| {
            if let Some(state) = state.upgrade() {
                state.select_preview(None)?;
            }
            Ok(())
        }));

        let state = self.weak_state();
        ids.push(self.bus.subscribe(ORDER_OPEN, move |_| {
            if let Some(state) = state.upgrade() {
                state.reset_form_errors();
            }
            Ok(())
        }));

        let state = self.weak_state();
        ids.push(
            self.bus
                .subscribe_typed(field_changes, move |change: FieldChange| {
                    if let Some(state) = state.upgrade() {
                        state.set_order_field_by_name(&change.field, change.value)?;
                    }
                    Ok(())
                }),
        );

        debug!(subscriptions = ids.len(), "presenter wired");
        Ok(ids)
    }

    /// Fetch the catalog and load it into the state.
    ///
    /// A failed fetch leaves the current catalog untouched. Returns the
    /// number of items loaded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`] if the fetch fails, or [`AppError::State`]
    /// if the listing is rejected.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<usize> {
        let items = self
            .api
            .fetch_catalog()
            .await
            .inspect_err(|e| warn!(error = %e, "catalog fetch failed"))?;
        let count = items.len();
        self.state.load_catalog(items)?;
        info!(items = count, "catalog loaded");
        Ok(count)
    }

    /// Fetch one item fresh from the backend and show it in the preview.
    ///
    /// When several calls overlap, the one that resolves last sets the
    /// preview.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Api`] if the fetch fails; the preview is left
    /// unchanged in that case.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn open_preview(&self, id: &ItemId) -> Result<()> {
        let item = self
            .api
            .fetch_item(id)
            .await
            .inspect_err(|e| warn!(error = %e, "item fetch failed"))?;
        self.state.select_preview(Some(&item))?;
        Ok(())
    }

    /// Validate and submit the current draft.
    ///
    /// Invalid input re-emits `formErrors:changed` before failing. A
    /// successful submission empties the basket and emits
    /// `order:submitted`; a rejected one emits `order:failed` and leaves the
    /// basket as it was.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidOrder`], [`AppError::EmptyBasket`], or the
    /// backend failure.
    #[instrument(skip(self))]
    pub async fn submit_order(&self) -> Result<OrderReceipt> {
        if !self.state.validate_order() {
            let errors = self.state.form_errors();
            self.state
                .emit_changes(FORM_ERRORS_CHANGED, json!({ "errors": &errors }))?;
            return Err(AppError::InvalidOrder(errors));
        }
        if self.state.basket_count() == 0 {
            return Err(AppError::EmptyBasket);
        }

        let request = self.state.order_request();
        match self.api.submit_order(&request).await {
            Ok(receipt) => {
                let total = receipt.total.unwrap_or(request.total);
                self.state.clear_basket();
                info!(order = %receipt.id, %total, "order submitted");
                let event = OrderSubmitted {
                    id: receipt.id.clone(),
                    total,
                    state: self.state.state_snapshot(),
                };
                self.publish(ORDER_SUBMITTED, &event)?;
                Ok(OrderReceipt {
                    id: receipt.id,
                    total: Some(total),
                })
            }
            Err(error) => {
                warn!(error = %error, "order submission failed");
                let event = OrderFailed {
                    error: error.to_string(),
                };
                self.publish(ORDER_FAILED, &event)?;
                Err(error.into())
            }
        }
    }

    /// Emit a typed presenter event.
    fn publish(&self, name: &str, event: &impl Serialize) -> Result<()> {
        let payload = serde_json::to_value(event).map_err(StateError::from)?;
        self.bus.emit(name, payload)?;
        Ok(())
    }

    fn weak_state(&self) -> Weak<AppState> {
        Arc::downgrade(&self.state)
    }

    /// Subscribe an intent whose payload is `{id}`.
    fn on_item<F>(&self, event: &str, action: F) -> SubscriptionId
    where
        F: Fn(&AppState, &ItemId) -> larek_state::Result<()> + Send + Sync + 'static,
    {
        let state = self.weak_state();
        self.bus.subscribe_typed(event, move |item: ItemRef| {
            if let Some(state) = state.upgrade() {
                action(&state, &item.id)?;
            }
            Ok(())
        })
    }
}

impl<A> std::fmt::Debug for ShopPresenter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopPresenter")
            .field("state", &self.state)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
