//! Web Larek State - event bus and reactive application state.
//!
//! This crate is the single seam between asynchronous network results and
//! synchronous view refresh:
//!
//! - [`EventBus`] - synchronous publish/subscribe with exact-name and
//!   pattern selectors plus catch-all observers
//! - [`ReactiveModel`] / [`Model`] - entities that announce JSON snapshots
//!   of themselves on the bus
//! - [`AppState`] - catalog, basket, checkout draft, validation and preview
//!
//! Collaborators call `AppState` operations; the state mutates itself and
//! emits; views subscribed earlier re-render. The state never references a
//! view.
//!
//! # Example
//!
//! ```rust
//! use larek_state::{AppState, EventBus, events};
//!
//! let bus = EventBus::new();
//! bus.subscribe(events::BASKET_UPDATED, |payload| {
//!     assert_eq!(payload["basket_count"], 1);
//!     Ok(())
//! });
//!
//! let state = AppState::new(bus.clone());
//! state.add_to_basket(&"854cef69".into())?;
//! # Ok::<(), larek_state::StateError>(())
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app_state;
pub mod bus;
pub mod error;
pub mod events;
pub mod model;

pub use app_state::AppState;
pub use bus::{
    DEFAULT_MAX_DISPATCH_DEPTH, EventBus, HandlerResult, Selector, SubscriptionId, merge_payload,
};
pub use error::{BusError, HandlerError, Result, StateError};
pub use model::{Model, ReactiveModel};
