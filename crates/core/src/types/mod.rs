//! Core types for Web Larek.
//!
//! This module provides type-safe wrappers for the shop's domain concepts.

pub mod catalog;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use catalog::{CatalogItem, CatalogItemUpdate, Description};
pub use id::*;
pub use order::{FormErrors, OrderDraft, OrderField, OrderReceipt, OrderRequest, UnknownOrderField};
pub use price::{Price, format_price};
pub use status::*;
