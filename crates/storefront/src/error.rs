//! Unified error handling for storefront operations.
//!
//! Provides a unified `AppError` type returned by the presenter's async
//! operations. Invalid checkout input is reported as data first (the
//! `formErrors:changed` event) and only then as [`AppError::InvalidOrder`].

use larek_core::FormErrors;
use larek_state::{BusError, StateError};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shop backend request failed.
    #[error("Shop API error: {0}")]
    Api(#[from] ApiError),

    /// State operation failed.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Event dispatch failed outside a state operation.
    #[error("Event error: {0}")]
    Bus(#[from] BusError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout fields failed validation.
    #[error("Invalid order: {}", .0.joined("; "))]
    InvalidOrder(FormErrors),

    /// Submission attempted with nothing in the basket.
    #[error("Basket is empty")]
    EmptyBasket,
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use larek_core::OrderDraft;

    use super::*;

    #[test]
    fn test_invalid_order_lists_messages() {
        let errors = OrderDraft::default().validate();
        let message = AppError::InvalidOrder(errors).to_string();
        assert!(message.starts_with("Invalid order: "));
        assert!(message.contains("Email is required"));
        assert!(message.contains("Delivery address is required"));
    }

    #[test]
    fn test_api_error_converts() {
        let err: AppError = ApiError::NotFound("/product/x".to_string()).into();
        assert_eq!(err.to_string(), "Shop API error: Not found: /product/x");
    }
}
