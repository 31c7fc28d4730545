//! Catalog item types.

use serde::{Deserialize, Serialize};

use super::id::ItemId;
use super::price::Price;

/// Item description: one text block or an ordered list of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    /// A single block of text.
    Text(String),
    /// Paragraphs in display order.
    Paragraphs(Vec<String>),
}

impl Description {
    /// Iterate the description as paragraphs.
    ///
    /// A single text block yields exactly one paragraph.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Text(text) => core::slice::from_ref(text),
            Self::Paragraphs(paragraphs) => paragraphs,
        };
        slice.iter().map(String::as_str)
    }
}

/// One purchasable catalog entry.
///
/// Only `id` is required on the wire; every other field falls back to its
/// default so sparse backend records still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Opaque id, unique within one catalog snapshot.
    pub id: ItemId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Optional long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Image reference (absolute URL once the API client has resolved it).
    #[serde(default)]
    pub image: String,
    /// Category label (e.g. "soft skill").
    #[serde(default)]
    pub category: String,
    /// Price, or `None` for items that cannot be priced.
    #[serde(default)]
    pub price: Option<Price>,
}

/// Light refresh shape for a single item (title and price only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemUpdate {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub price: Option<Price>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_item_uses_defaults() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"id":"a","title":"Mood booster","price":null}"#).unwrap();
        assert_eq!(item.id.as_str(), "a");
        assert!(item.description.is_none());
        assert!(item.category.is_empty());
        assert_eq!(item.price, None);
    }

    #[test]
    fn test_item_without_id_is_rejected() {
        let result: Result<CatalogItem, _> = serde_json::from_str(r#"{"title":"Mood booster"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_description_text_and_paragraphs() {
        let text: Description = serde_json::from_str(r#""one line""#).unwrap();
        assert_eq!(text.paragraphs().collect::<Vec<_>>(), vec!["one line"]);

        let paragraphs: Description = serde_json::from_str(r#"["first","second"]"#).unwrap();
        assert_eq!(
            paragraphs.paragraphs().collect::<Vec<_>>(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_full_item_from_api_shape() {
        let json = r#"{
            "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
            "description": "If you plan to solve problems in the tracker.",
            "image": "/5_Dots.svg",
            "title": "+1 hour in the day",
            "category": "soft skill",
            "price": 750
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.price, Some(Price::from_units(750)));
        assert_eq!(item.category, "soft skill");
    }
}
