//! `larek catalog` - list the catalog.

use larek_core::{CatalogItem, format_price};
use larek_state::events::{CATALOG_CHANGED, CatalogChanged};

use super::Shop;

/// Fetch the catalog and print it as a table.
///
/// Rendering is driven by `catalog:changed`, the same event a gallery view
/// listens to.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched or loaded.
pub async fn list(shop: &Shop) -> Result<(), Box<dyn std::error::Error>> {
    let view = shop
        .bus()
        .subscribe_typed(CATALOG_CHANGED, |event: CatalogChanged| {
            render(&event.catalog);
            Ok(())
        });

    let loaded = shop.presenter.load_catalog().await;
    shop.bus().unsubscribe(view);
    let count = loaded?;
    tracing::info!(items = count, "catalog listed");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn render(catalog: &[CatalogItem]) {
    for item in catalog {
        println!(
            "{:<38} {:<12} {:<28} {}",
            item.id.as_str(),
            item.category,
            item.title,
            format_price(item.price)
        );
    }
}
