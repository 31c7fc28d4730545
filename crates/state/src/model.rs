//! Reactive model base.
//!
//! [`ReactiveModel`] is implemented by anything that announces its own
//! changes on the bus. `emit_changes` sends a fresh JSON snapshot of the
//! entity merged with an extra payload, so subscribers never hold a handle
//! onto data the model keeps mutating.
//!
//! [`Model<T>`] wraps a plain data type into such an entity and builds it
//! from a partial JSON object merged over `T::default()`.

use std::ops::Deref;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::bus::{EventBus, merge_payload};
use crate::error::Result;

/// An entity that notifies the bus about its changes.
pub trait ReactiveModel {
    /// Bus the entity publishes on.
    fn bus(&self) -> &EventBus;

    /// Owned copy of the entity's current fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields cannot be represented as JSON.
    fn snapshot(&self) -> Result<Value>;

    /// Emit `name` with the current snapshot merged with `extra`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot fails or a handler fails.
    fn emit_changes(&self, name: &str, extra: Value) -> Result<()> {
        let payload = merge_payload(self.snapshot()?, extra);
        self.bus().emit(name, payload)?;
        Ok(())
    }
}

/// A data value bound to the bus it reports changes on.
#[derive(Debug, Clone)]
pub struct Model<T> {
    data: T,
    bus: EventBus,
}

impl<T> Model<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    /// Build a model from `partial` fields merged over the type defaults.
    ///
    /// `partial` may be `null` (all defaults) or an object holding any
    /// subset of the fields.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Model`](crate::StateError::Model) if the merged
    /// fields do not form a valid `T`.
    pub fn new(partial: Value, bus: EventBus) -> Result<Self> {
        let defaults = serde_json::to_value(T::default())?;
        let data = serde_json::from_value(merge_payload(defaults, partial))?;
        Ok(Self { data, bus })
    }
}

impl<T> Model<T> {
    /// Bind an already-built value to `bus`.
    pub const fn from_data(data: T, bus: EventBus) -> Self {
        Self { data, bus }
    }

    /// Borrow the wrapped data.
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Mutable access for callers that emit once they are done editing.
    pub const fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<T> Deref for Model<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: Serialize> ReactiveModel for Model<T> {
    fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn snapshot(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.data)?)
    }
}
