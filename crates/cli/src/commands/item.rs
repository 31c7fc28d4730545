//! `larek item` - show one catalog item.

use larek_core::{CatalogItem, ItemId, format_price};
use larek_state::events::PREVIEW_CHANGED;
use larek_storefront::ShopApi;

use super::Shop;

/// Fetch one item and print its card.
///
/// The item goes through the preview, so the card is rendered from
/// `preview:changed`.
///
/// # Errors
///
/// Returns an error if the item cannot be fetched.
pub async fn show(shop: &Shop, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let view = shop
        .bus()
        .subscribe_typed(PREVIEW_CHANGED, |item: Option<CatalogItem>| {
            if let Some(item) = item {
                render(&item);
            }
            Ok(())
        });

    let opened = shop.presenter.open_preview(&ItemId::new(id)).await;
    shop.bus().unsubscribe(view);
    opened?;
    Ok(())
}

/// Print only the current title and price of one item.
///
/// # Errors
///
/// Returns an error if the item cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn brief(shop: &Shop, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let update = shop
        .presenter
        .api()
        .fetch_item_update(&ItemId::new(id))
        .await?;
    println!("{} - {}", update.title, format_price(update.price));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn render(item: &CatalogItem) {
    println!("{} [{}]", item.title, item.category);
    println!("{}", format_price(item.price));
    if let Some(description) = &item.description {
        println!();
        for paragraph in description.paragraphs() {
            println!("{paragraph}");
        }
    }
    if !item.image.is_empty() {
        println!();
        println!("{}", item.image);
    }
}
