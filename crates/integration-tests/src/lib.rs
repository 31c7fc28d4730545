//! Integration tests for Web Larek.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p larek-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `shop_flow` - presenter, state and bus working together
//! - `event_contract` - event names, payload shapes and ordering
//! - `http_client` - `LarekClient` against a local stub backend
//!
//! This crate provides the shared fixtures: an in-memory [`ShopApi`], an
//! event recorder and a minimal HTTP backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use larek_core::{
    CatalogItem, CatalogItemUpdate, Description, ItemId, OrderId, OrderReceipt, OrderRequest,
    Price,
};
use larek_state::{AppState, EventBus, SubscriptionId};
use larek_storefront::{ApiError, ShopApi, ShopPresenter};
use parking_lot::Mutex;
use serde_json::Value;

// =============================================================================
// Fixtures
// =============================================================================

/// Build one catalog item.
#[must_use]
pub fn item(id: &str, title: &str, price: Option<i64>) -> CatalogItem {
    CatalogItem {
        id: ItemId::new(id),
        title: title.to_string(),
        description: Some(Description::Text(format!("About {title}"))),
        image: format!("/{id}.svg"),
        category: "soft skill".to_string(),
        price: price.map(Price::from_units),
    }
}

/// Small catalog with one priceless item.
#[must_use]
pub fn sample_catalog() -> Vec<CatalogItem> {
    vec![
        item("a", "+1 hour in a day", Some(750)),
        item("b", "HEX-lollipop", Some(1450)),
        item("c", "Mamka-timer", None),
        item("d", "Fog machine", Some(100)),
    ]
}

// =============================================================================
// In-memory backend
// =============================================================================

/// [`ShopApi`] serving a fixed catalog from memory.
#[derive(Default)]
pub struct InMemoryShop {
    catalog: Mutex<Vec<CatalogItem>>,
    orders: Mutex<Vec<OrderRequest>>,
    failing: AtomicBool,
}

impl InMemoryShop {
    #[must_use]
    pub fn new(catalog: Vec<CatalogItem>) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            ..Self::default()
        }
    }

    /// Make every following call fail with a 503.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace the served catalog.
    pub fn set_catalog(&self, catalog: Vec<CatalogItem>) {
        *self.catalog.lock() = catalog;
    }

    /// Orders received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().clone()
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl ShopApi for InMemoryShop {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, ApiError> {
        self.check()?;
        Ok(self.catalog.lock().clone())
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<CatalogItem, ApiError> {
        self.check()?;
        self.catalog
            .lock()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/product/{id}")))
    }

    async fn fetch_item_update(&self, id: &ItemId) -> Result<CatalogItemUpdate, ApiError> {
        let item = self.fetch_item(id).await?;
        Ok(CatalogItemUpdate {
            id: item.id,
            title: item.title,
            price: item.price,
        })
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        self.check()?;
        let mut orders = self.orders.lock();
        orders.push(order.clone());
        Ok(OrderReceipt {
            id: OrderId::new(format!("order-{}", orders.len())),
            total: Some(order.total),
        })
    }
}

// =============================================================================
// Event recording
// =============================================================================

/// Records every emission on a bus, in order.
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<(String, Value)>>>,
}

impl EventLog {
    /// Attach a recorder to `bus` as a catch-all observer.
    #[must_use]
    pub fn attach(bus: &EventBus) -> (Self, SubscriptionId) {
        let log = Self::default();
        let sink = Arc::clone(&log.entries);
        let id = bus.observe_all(move |event, payload| {
            sink.lock().push((event.to_string(), payload.clone()));
            Ok(())
        });
        (log, id)
    }

    /// Event names in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Payloads of every emission of `name`.
    #[must_use]
    pub fn payloads(&self, name: &str) -> Vec<Value> {
        self.entries
            .lock()
            .iter()
            .filter(|(event, _)| event == name)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Payload of the latest emission of `name`.
    #[must_use]
    pub fn last(&self, name: &str) -> Option<Value> {
        self.payloads(name).pop()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Presenter over an [`InMemoryShop`] with a recorder on its bus.
pub struct Harness {
    pub presenter: ShopPresenter<InMemoryShop>,
    pub log: EventLog,
}

impl Harness {
    /// Wire a fresh state and presenter serving `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if the presenter cannot be wired.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(catalog: Vec<CatalogItem>) -> Self {
        let bus = EventBus::new();
        let (log, _) = EventLog::attach(&bus);
        let state = Arc::new(AppState::new(bus));
        let presenter = ShopPresenter::new(state, InMemoryShop::new(catalog));
        presenter.wire().expect("presenter wiring");
        Self { presenter, log }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        self.presenter.state()
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        self.presenter.bus()
    }

    #[must_use]
    pub fn shop(&self) -> &InMemoryShop {
        self.presenter.api()
    }
}
