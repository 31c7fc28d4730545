//! Event stream logging.

use larek_state::{EventBus, SubscriptionId};
use tracing::debug;

/// Log every event emitted on `bus` at debug level.
///
/// Returns the observer id so the caller can detach it again.
pub fn install(bus: &EventBus) -> SubscriptionId {
    bus.observe_all(|event, payload| {
        debug!(target: "larek::events", event, %payload, "event");
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_install_and_detach() {
        let bus = EventBus::new();
        let id = install(&bus);
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit("basket:add", json!({"id": "a"})).unwrap();

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
