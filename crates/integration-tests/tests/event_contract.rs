//! Event names, payload shapes and ordering as seen by subscribers.
//!
//! Views depend on these shapes; a change here is a breaking change for
//! every widget.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use larek_core::{CatalogItem, OrderDraft, OrderField};
use larek_integration_tests::{EventLog, Harness, sample_catalog};
use larek_state::events::{
    BASKET_ADD, BASKET_DELETE, BASKET_REMOVED, BASKET_UPDATED, BasketChanged, CARD_SELECT,
    CATALOG_CHANGED, CatalogChanged, FORM_ERRORS_CHANGED, FormErrorsChanged, ORDER_READY,
    PREVIEW_CHANGED, PREVIEW_CLOSE, order_field_change,
};
use larek_state::{AppState, BusError, EventBus, StateError};
use parking_lot::Mutex;
use serde_json::{Value, json};

// =============================================================================
// Payload shapes
// =============================================================================

#[tokio::test]
async fn test_catalog_changed_payload() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    let payload = harness.log.last(CATALOG_CHANGED).unwrap();
    let event: CatalogChanged = serde_json::from_value(payload.clone()).unwrap();
    assert_eq!(event.catalog, sample_catalog());
    assert_eq!(event.state.basket_count, 0);
    assert_eq!(payload["catalog"][2]["price"], Value::Null);
}

#[tokio::test]
async fn test_basket_payloads_carry_ids_and_count() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    harness.bus().emit(BASKET_ADD, json!({ "id": "a" })).unwrap();
    harness.bus().emit(BASKET_ADD, json!({ "id": "b" })).unwrap();
    harness.bus().emit(BASKET_DELETE, json!({ "id": "a" })).unwrap();

    let updated: Vec<BasketChanged> = harness
        .log
        .payloads(BASKET_UPDATED)
        .into_iter()
        .map(|payload| serde_json::from_value(payload).unwrap())
        .collect();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[1].items.len(), 2);
    assert_eq!(updated[1].state.basket_count, 2);

    let removed: BasketChanged =
        serde_json::from_value(harness.log.last(BASKET_REMOVED).unwrap()).unwrap();
    assert_eq!(removed.items, vec!["b".into()]);
    assert_eq!(removed.state.basket_count, 1);
}

#[tokio::test]
async fn test_preview_payloads() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    harness.bus().emit(CARD_SELECT, json!({ "id": "c" })).unwrap();
    harness.bus().emit(PREVIEW_CLOSE, Value::Null).unwrap();

    let payloads = harness.log.payloads(PREVIEW_CHANGED);
    assert_eq!(payloads.len(), 2);
    let shown: CatalogItem = serde_json::from_value(payloads[0].clone()).unwrap();
    assert_eq!(shown.title, "Mamka-timer");
    assert_eq!(shown.price, None);
    assert_eq!(payloads[1], Value::Null);
}

#[test]
fn test_form_events_order_and_shapes() {
    let bus = EventBus::new();
    let (log, _) = EventLog::attach(&bus);
    let state = AppState::new(bus);

    state.set_order_field(OrderField::Email, "a@b.c").unwrap();
    state.set_order_field(OrderField::Phone, "+7").unwrap();
    state.set_order_field(OrderField::Address, "Moscow").unwrap();

    assert_eq!(
        log.names(),
        vec![
            FORM_ERRORS_CHANGED,
            FORM_ERRORS_CHANGED,
            FORM_ERRORS_CHANGED,
            ORDER_READY
        ]
    );

    let first: FormErrorsChanged =
        serde_json::from_value(log.payloads(FORM_ERRORS_CHANGED)[0].clone()).unwrap();
    assert_eq!(first.errors.len(), 2);
    assert!(first.errors.get(OrderField::Email).is_none());

    let last: FormErrorsChanged =
        serde_json::from_value(log.last(FORM_ERRORS_CHANGED).unwrap()).unwrap();
    assert!(last.errors.is_valid());

    let ready: OrderDraft = serde_json::from_value(log.last(ORDER_READY).unwrap()).unwrap();
    assert_eq!(ready.address, "Moscow");
}

#[test]
fn test_field_change_events_match_presenter_pattern() {
    let harness = Harness::new(sample_catalog());
    for field in OrderField::ALL {
        harness
            .bus()
            .emit(
                &order_field_change(field),
                json!({ "field": field.as_str(), "value": "x" }),
            )
            .unwrap();
    }
    assert_eq!(harness.log.payloads(FORM_ERRORS_CHANGED).len(), 4);
    assert_eq!(harness.state().order().payment, "x");
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_view_reacting_to_state_can_read_fresh_state() {
    let bus = EventBus::new();
    let state = Arc::new(AppState::new(bus.clone()));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let view_state = Arc::downgrade(&state);
    let sink = Arc::clone(&seen);
    bus.subscribe(BASKET_UPDATED, move |_| {
        if let Some(state) = view_state.upgrade() {
            sink.lock().push(state.basket_count());
        }
        Ok(())
    });

    state.add_to_basket(&"a".into()).unwrap();
    state.add_to_basket(&"b".into()).unwrap();
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_failing_view_surfaces_to_caller() {
    let bus = EventBus::new();
    let state = AppState::new(bus.clone());
    bus.subscribe(BASKET_UPDATED, |_| Err("render failed".into()));

    let err = state.add_to_basket(&"a".into()).unwrap_err();
    let StateError::Bus(bus_error) = err else {
        panic!("expected a dispatch error");
    };
    assert!(matches!(bus_error, BusError::Handler { ref event, .. } if event == BASKET_UPDATED));
    assert_eq!(state.basket_count(), 1);
}

#[test]
fn test_runaway_reentrancy_is_bounded() {
    let bus = EventBus::with_max_depth(4);
    let inner = bus.clone();
    bus.subscribe("ping", move |payload| Ok(inner.emit("ping", payload.clone())?));

    let err = bus.emit("ping", Value::Null).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        BusError::DispatchDepthExceeded { limit: 4, .. }
    ));
}
