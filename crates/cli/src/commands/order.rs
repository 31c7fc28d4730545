//! `larek order` - fill the basket and checkout form, then submit.
//!
//! Drives the same intents a browser UI emits: `basket:add` per item and
//! one `order.<field>:change` per form field.

use larek_core::{ItemId, OrderDraft, OrderField, format_price};
use larek_state::events::{BASKET_ADD, FORM_ERRORS_CHANGED, FormErrorsChanged, order_field_change};
use larek_storefront::AppError;
use serde_json::json;

use super::Shop;

/// Load the catalog, add `items` to the basket, fill the form and submit.
///
/// Only the checkout fields of `form` are used; its item list is ignored.
///
/// # Errors
///
/// Returns an error if an id is not in the catalog, the form is invalid,
/// or the backend rejects the order.
#[allow(clippy::print_stdout)]
pub async fn place(
    shop: &Shop,
    form: &OrderDraft,
    items: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    shop.presenter.load_catalog().await?;

    for id in items {
        let id = ItemId::new(id.as_str());
        if shop.state().item(&id).is_none() {
            return Err(format!("item {id} is not in the catalog").into());
        }
        shop.bus().emit(BASKET_ADD, json!({ "id": id }))?;
    }
    tracing::info!(
        items = shop.state().basket_count(),
        total = %shop.state().basket_total(),
        "basket filled"
    );

    let errors_view = shop
        .bus()
        .subscribe_typed(FORM_ERRORS_CHANGED, |event: FormErrorsChanged| {
            for field in event.errors.fields() {
                tracing::debug!(%field, "field still invalid");
            }
            Ok(())
        });

    for field in OrderField::ALL {
        let change = shop
            .bus()
            .bind(order_field_change(field), json!({ "field": field.as_str() }));
        change(json!({ "value": form.get(field) }))?;
    }

    let submitted = shop.presenter.submit_order().await;
    shop.bus().unsubscribe(errors_view);

    match submitted {
        Ok(receipt) => {
            println!("Order {} placed", receipt.id);
            println!("Charged {}", format_price(receipt.total));
            Ok(())
        }
        Err(AppError::InvalidOrder(errors)) => {
            Err(format!("order form is incomplete: {}", errors.joined("; ")).into())
        }
        Err(e) => Err(e.into()),
    }
}
