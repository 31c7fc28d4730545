//! Wire shapes specific to the shop backend.

use serde::{Deserialize, Serialize};

/// Envelope of list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiListResponse<T> {
    pub total: usize,
    pub items: Vec<T>,
}

/// Body of a non-success response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larek_core::{CatalogItem, Price};

    use super::*;

    #[test]
    fn test_list_response_decodes_backend_shape() {
        let body = r#"{
            "total": 2,
            "items": [
                {
                    "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
                    "description": "If you plan to solve tasks in a tracker, add a flag to the bug.",
                    "image": "/5_Dots.svg",
                    "title": "+1 hour in a day",
                    "category": "soft skill",
                    "price": 750
                },
                {
                    "id": "b06cde61-912f-4663-9751-09956c0eed67",
                    "description": "Will you find an apple pie in a river of milk?",
                    "image": "/Shell.svg",
                    "title": "Mamka-timer",
                    "category": "other",
                    "price": null
                }
            ]
        }"#;

        let list: ApiListResponse<CatalogItem> = serde_json::from_str(body).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.items[0].price, Some(Price::from_units(750)));
        assert_eq!(list.items[1].price, None);
    }

    #[test]
    fn test_error_body() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error": "NotFound"}"#).unwrap();
        assert_eq!(body.error, "NotFound");
    }
}
