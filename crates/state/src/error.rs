//! Error types for event dispatch and state operations.
//!
//! Validation failures are not errors: they travel as
//! [`FormErrors`](larek_core::FormErrors) data. Everything here is either a
//! caller mistake (bad field name, bad pattern, unknown item) or a handler
//! failure propagated out of `emit`.

use larek_core::{ItemId, UnknownOrderField};
use thiserror::Error;

/// Error a subscriber may return; propagated to the `emit` caller.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the [`EventBus`](crate::EventBus).
#[derive(Debug, Error)]
pub enum BusError {
    /// A pattern selector did not compile.
    #[error("invalid event pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A subscriber returned an error; remaining subscribers were skipped.
    #[error("handler for {event} failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: HandlerError,
    },

    /// A typed subscriber received a payload of the wrong shape.
    #[error("payload for {event} did not decode: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// Handlers kept emitting into each other past the nesting limit.
    #[error("dispatch depth limit {limit} exceeded while emitting {event}")]
    DispatchDepthExceeded { event: String, limit: usize },
}

impl BusError {
    /// The innermost bus error, following handler failures that were
    /// themselves caused by a nested emission.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Handler { source, .. } = current {
            match source.downcast_ref::<Self>() {
                Some(inner) => current = inner,
                None => match source.downcast_ref::<StateError>() {
                    Some(StateError::Bus(inner)) => current = inner,
                    _ => break,
                },
            }
        }
        current
    }
}

/// Errors raised by [`AppState`](crate::AppState) and
/// [`Model`](crate::Model) operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// A field name outside the closed order field set.
    #[error("invalid argument: {0}")]
    InvalidField(#[from] UnknownOrderField),

    /// An id that is not in the current catalog.
    #[error("unknown catalog item: {0}")]
    UnknownItem(ItemId),

    /// A catalog record arrived without an id.
    #[error("catalog item at position {position} has no id")]
    MissingItemId { position: usize },

    /// A catalog snapshot listed the same id twice.
    #[error("duplicate catalog item id: {0}")]
    DuplicateItem(ItemId),

    /// Model data could not be built from or turned into JSON.
    #[error("malformed model data: {0}")]
    Model(#[from] serde_json::Error),

    /// Emitting a change notification failed.
    #[error("event dispatch failed: {0}")]
    Bus(#[from] BusError),
}

/// Result type alias for [`StateError`].
pub type Result<T> = std::result::Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_display() {
        let err = StateError::from(UnknownOrderField("total".to_string()));
        assert_eq!(err.to_string(), "invalid argument: unknown order field: total");
    }

    #[test]
    fn test_root_cause_unwraps_nested_handlers() {
        let inner = BusError::DispatchDepthExceeded {
            event: "ping".to_string(),
            limit: 4,
        };
        let outer = BusError::Handler {
            event: "pong".to_string(),
            source: Box::new(BusError::Handler {
                event: "ping".to_string(),
                source: Box::new(StateError::Bus(inner)),
            }),
        };
        assert!(matches!(
            outer.root_cause(),
            BusError::DispatchDepthExceeded { limit: 4, .. }
        ));
    }
}
