//! Web Larek Core - Shared domain types.
//!
//! This crate provides the types every other Web Larek component speaks:
//! - `state` - Event bus and reactive application state
//! - `storefront` - API client and presenter wiring
//! - `cli` - Command-line shop driver
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no event
//! dispatch, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, catalog items, order drafts and
//!   validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
