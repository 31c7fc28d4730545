//! Web Larek Storefront - backend client and presenter wiring.
//!
//! Everything around the synchronous state that a shop client needs:
//!
//! - [`config`] - environment-driven configuration
//! - [`api`] - the [`ShopApi`](api::ShopApi) collaborator and its HTTP client
//! - [`presenter`] - intent subscriptions and async backend operations
//! - [`diagnostics`] - event stream logging

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod presenter;

pub use api::{ApiError, LarekClient, ShopApi};
pub use config::{ConfigError, StorefrontConfig};
pub use error::AppError;
pub use presenter::ShopPresenter;
