//! End-to-end shop flows: intents on the bus, presenter reactions and the
//! resulting state.
//!
//! Run with: cargo test -p larek-integration-tests --test `shop_flow`

#![allow(clippy::unwrap_used)]

use larek_core::{ItemId, OrderField, OrderPhase, Price};
use larek_integration_tests::{Harness, item, sample_catalog};
use larek_state::events::{
    BASKET_ADD, BASKET_DELETE, CARD_SELECT, ORDER_FAILED, ORDER_OPEN, ORDER_READY,
    ORDER_SUBMITTED, PREVIEW_CLOSE, order_field_change,
};
use larek_storefront::AppError;
use serde_json::{Value, json};

fn fill_form(harness: &Harness) {
    for (field, value) in [
        (OrderField::Payment, "card"),
        (OrderField::Email, "buyer@example.com"),
        (OrderField::Phone, "+7 999 000-00-00"),
        (OrderField::Address, "Moscow, Lenina 1"),
    ] {
        let change = harness
            .bus()
            .bind(order_field_change(field), json!({ "field": field.as_str() }));
        change(json!({ "value": value })).unwrap();
    }
}

fn add(harness: &Harness, id: &str) {
    harness.bus().emit(BASKET_ADD, json!({ "id": id })).unwrap();
}

// =============================================================================
// Browsing
// =============================================================================

#[tokio::test]
async fn test_browse_and_preview() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    harness.bus().emit(CARD_SELECT, json!({ "id": "b" })).unwrap();
    assert_eq!(harness.state().preview(), Some(ItemId::new("b")));

    let close = harness.bus().bind_signal(PREVIEW_CLOSE, Value::Null);
    close().unwrap();
    assert_eq!(harness.state().preview(), None);
}

#[tokio::test]
async fn test_selecting_unknown_card_fails_without_changing_preview() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    harness.bus().emit(CARD_SELECT, json!({ "id": "a" })).unwrap();

    let result = harness.bus().emit(CARD_SELECT, json!({ "id": "zzz" }));
    assert!(result.is_err());
    assert_eq!(harness.state().preview(), Some(ItemId::new("a")));
}

#[tokio::test]
async fn test_reload_picks_up_new_catalog() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    add(&harness, "a");

    harness
        .shop()
        .set_catalog(vec![item("a", "+1 hour in a day", Some(900))]);
    harness.presenter.load_catalog().await.unwrap();

    assert_eq!(harness.state().catalog().len(), 1);
    assert_eq!(harness.state().basket_total(), Price::from_units(900));
}

#[tokio::test]
async fn test_overlapping_previews_last_resolution_wins() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    let (a, d) = (ItemId::new("a"), ItemId::new("d"));
    let (first, second) = tokio::join!(
        harness.presenter.open_preview(&a),
        harness.presenter.open_preview(&d),
    );
    first.unwrap();
    second.unwrap();

    let last = harness.log.last("preview:changed").unwrap();
    assert_eq!(
        harness.state().preview().unwrap().as_str(),
        last["id"].as_str().unwrap()
    );
}

// =============================================================================
// Basket
// =============================================================================

#[tokio::test]
async fn test_basket_through_intents() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();

    add(&harness, "a");
    add(&harness, "a");
    add(&harness, "c");
    assert_eq!(harness.state().basket_count(), 2);
    assert_eq!(harness.state().basket_total(), Price::from_units(750));
    assert_eq!(harness.state().resolved_basket_items().len(), 2);

    harness.bus().emit(BASKET_DELETE, json!({ "id": "a" })).unwrap();
    assert_eq!(harness.state().basket(), vec![ItemId::new("c")]);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_happy_path() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    add(&harness, "a");
    add(&harness, "b");

    let open_order = harness.bus().bind_signal(ORDER_OPEN, Value::Null);
    open_order().unwrap();
    fill_form(&harness);
    assert_eq!(harness.state().order_phase(), OrderPhase::Valid);
    assert_eq!(harness.log.payloads(ORDER_READY).len(), 1);

    let receipt = harness.presenter.submit_order().await.unwrap();
    assert_eq!(receipt.id.as_str(), "order-1");
    assert_eq!(receipt.total, Some(Price::from_units(2200)));

    let orders = harness.shop().orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payment, "card");
    assert_eq!(orders[0].address, "Moscow, Lenina 1");
    assert_eq!(orders[0].items, vec![ItemId::new("a"), ItemId::new("b")]);

    assert_eq!(harness.state().basket_count(), 0);
    assert_eq!(harness.state().order().email, "buyer@example.com");

    let submitted = harness.log.last(ORDER_SUBMITTED).unwrap();
    assert_eq!(submitted["id"], "order-1");
    assert_eq!(submitted["basket_count"], 0);
}

#[tokio::test]
async fn test_checkout_with_missing_fields() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    add(&harness, "a");

    let change = harness
        .bus()
        .bind(order_field_change(OrderField::Email), json!({ "field": "email" }));
    change(json!({ "value": "buyer@example.com" })).unwrap();

    let Err(AppError::InvalidOrder(errors)) = harness.presenter.submit_order().await else {
        panic!("expected invalid order");
    };
    let fields: Vec<OrderField> = errors.fields().collect();
    assert_eq!(fields, vec![OrderField::Phone, OrderField::Address]);
    assert!(harness.shop().orders().is_empty());
    assert_eq!(harness.state().basket_count(), 1);
}

#[tokio::test]
async fn test_failed_submission_can_be_retried() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    add(&harness, "d");
    fill_form(&harness);

    harness.shop().set_failing(true);
    assert!(matches!(
        harness.presenter.submit_order().await,
        Err(AppError::Api(_))
    ));
    assert_eq!(harness.state().basket_count(), 1);
    assert!(harness.log.last(ORDER_FAILED).is_some());

    harness.shop().set_failing(false);
    let receipt = harness.presenter.submit_order().await.unwrap();
    assert_eq!(receipt.total, Some(Price::from_units(100)));
    assert_eq!(harness.state().basket_count(), 0);
}

#[tokio::test]
async fn test_unresolved_basket_ids_are_submitted_but_not_charged() {
    let harness = Harness::new(sample_catalog());
    harness.presenter.load_catalog().await.unwrap();
    add(&harness, "a");
    add(&harness, "gone");
    fill_form(&harness);

    harness.presenter.submit_order().await.unwrap();

    let order = &harness.shop().orders()[0];
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total, Price::from_units(750));
}
