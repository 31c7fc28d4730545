//! `EventBus` - synchronous, in-process publish/subscribe.
//!
//! Subscribers register against a [`Selector`]: either an exact event name
//! or a regular expression matching a family of names (e.g. every
//! `order.<field>:change`). `emit` runs, in order:
//!
//! 1. exact-name handlers, in registration order;
//! 2. pattern handlers whose pattern matches, in registration order;
//! 3. `observe_all` observers, in registration order.
//!
//! Emitting a name nobody listens to is a silent no-op. The first handler
//! error aborts the emission and is returned to the `emit` caller; there is
//! no isolation between handlers.
//!
//! Handler lists are snapshotted before dispatch and no lock is held while
//! handlers run, so a handler may subscribe, unsubscribe or emit. A handler
//! added during an emission fires from the next emission on; one removed
//! during an emission still fires for that emission. Nested emissions run to
//! completion before the outer handler continues, and nesting deeper than
//! the bus's dispatch limit fails with
//! [`BusError::DispatchDepthExceeded`]. Nesting is counted per thread, so
//! emissions running side by side on other threads never count against
//! each other.
//!
//! The bus is a cheap cloneable handle. Construct one at startup and pass
//! clones to every component that publishes or subscribes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BusError, HandlerError};

/// Nesting limit for emissions triggered from inside handlers.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 32;

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Emissions in progress on this thread, per bus id.
    static DISPATCH_DEPTH: RefCell<HashMap<u64, usize>> = RefCell::new(HashMap::new());
}

/// Outcome of a subscriber call.
pub type HandlerResult = Result<(), HandlerError>;

/// Identifies one registration; pass to [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which event names a subscription receives.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Exactly this name.
    Exact(String),
    /// Every name the expression matches.
    Pattern(Regex),
}

impl Selector {
    /// Select a single event name.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    /// Select every event name matching a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InvalidPattern`] if the expression does not
    /// compile.
    pub fn pattern(pattern: &str) -> Result<Self, BusError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| BusError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Whether `name` is selected.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }

    /// Whether this is a pattern selector.
    #[must_use]
    pub const fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::exact(name)
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Exact(name)
    }
}

impl From<Regex> for Selector {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

/// Shallow-merge two payloads.
///
/// Object keys of `overlay` replace those of `base`. A null overlay keeps
/// `base`; any other non-object overlay replaces it outright.
#[must_use]
pub fn merge_payload(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Object(mut base), Value::Object(overlay)) => {
            base.extend(overlay);
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

type Dispatch = dyn Fn(&str, &Value) -> Result<(), BusError> + Send + Sync;

struct Subscription {
    id: SubscriptionId,
    selector: Selector,
    handler: Arc<Dispatch>,
}

struct BusInner {
    subscriptions: Mutex<Vec<Subscription>>,
    observers: Mutex<Vec<(SubscriptionId, Arc<Dispatch>)>>,
    next_id: AtomicU64,
    bus_id: u64,
    max_depth: usize,
}

/// Synchronous publish/subscribe dispatcher.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus with the default dispatch depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DISPATCH_DEPTH)
    }

    /// Create a bus allowing at most `max_depth` nested emissions.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscriptions: Mutex::new(Vec::new()),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                bus_id: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
                max_depth: max_depth.max(1),
            }),
        }
    }

    /// Register `handler` for every event `selector` matches.
    pub fn subscribe<F>(&self, selector: impl Into<Selector>, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
    {
        let dispatch = move |event: &str, payload: &Value| {
            handler(payload).map_err(|source| BusError::Handler {
                event: event.to_string(),
                source,
            })
        };
        self.register(selector.into(), Arc::new(dispatch))
    }

    /// Register `handler` with the payload decoded into `T`.
    ///
    /// A payload that does not decode fails the emission with
    /// [`BusError::Payload`].
    pub fn subscribe_typed<T, F>(&self, selector: impl Into<Selector>, handler: F) -> SubscriptionId
    where
        T: DeserializeOwned,
        F: Fn(T) -> HandlerResult + Send + Sync + 'static,
    {
        let dispatch = move |event: &str, payload: &Value| {
            let decoded = T::deserialize(payload).map_err(|source| BusError::Payload {
                event: event.to_string(),
                source,
            })?;
            handler(decoded).map_err(|source| BusError::Handler {
                event: event.to_string(),
                source,
            })
        };
        self.register(selector.into(), Arc::new(dispatch))
    }

    /// Register `handler` for every emission, after the name-specific
    /// handlers. Meant for diagnostics, not business logic.
    pub fn observe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.next_id();
        let dispatch = move |event: &str, payload: &Value| {
            handler(event, payload).map_err(|source| BusError::Handler {
                event: event.to_string(),
                source,
            })
        };
        self.inner.observers.lock().push((id, Arc::new(dispatch)));
        id
    }

    /// Remove a subscription or observer.
    ///
    /// Returns `false` if `id` was not registered (safe to call twice).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.inner.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        if subscriptions.len() != before {
            return true;
        }
        drop(subscriptions);

        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    /// Remove every subscription and observer.
    pub fn clear(&self) {
        self.inner.subscriptions.lock().clear();
        self.inner.observers.lock().clear();
    }

    /// Total number of subscriptions and observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.lock().len() + self.inner.observers.lock().len()
    }

    /// Deliver `payload` to every matching handler, then to observers.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure, or
    /// [`BusError::DispatchDepthExceeded`] when called from handlers nested
    /// deeper than the bus allows.
    pub fn emit(&self, name: &str, payload: Value) -> Result<(), BusError> {
        let _depth = DepthGuard::enter(&self.inner, name)?;

        let handlers = self.matching(name);
        let observers: Vec<Arc<Dispatch>> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        if handlers.is_empty() && observers.is_empty() {
            tracing::trace!(event = name, "no subscribers");
            return Ok(());
        }

        tracing::trace!(
            event = name,
            handlers = handlers.len(),
            observers = observers.len(),
            "dispatching event"
        );
        for handler in handlers.iter().chain(observers.iter()) {
            handler(name, &payload)?;
        }
        Ok(())
    }

    /// Build a callback that emits `name` with `extra` merged over its
    /// argument. See [`EventBus::bind_signal`] for sources without one.
    pub fn bind(
        &self,
        name: impl Into<String>,
        extra: Value,
    ) -> impl Fn(Value) -> Result<(), BusError> + Send + Sync + 'static {
        let bus = self.clone();
        let name = name.into();
        move |argument: Value| bus.emit(&name, merge_payload(argument, extra.clone()))
    }

    /// Build a no-argument callback that emits `name` with `extra` as the
    /// whole payload (e.g. a close button).
    pub fn bind_signal(
        &self,
        name: impl Into<String>,
        extra: Value,
    ) -> impl Fn() -> Result<(), BusError> + Send + Sync + 'static {
        let bind = self.bind(name, extra);
        move || bind(Value::Null)
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn register(&self, selector: Selector, handler: Arc<Dispatch>) -> SubscriptionId {
        let id = self.next_id();
        tracing::trace!(subscription = %id, ?selector, "subscribed");
        self.inner.subscriptions.lock().push(Subscription {
            id,
            selector,
            handler,
        });
        id
    }

    /// Exact-name handlers first, then matching patterns.
    fn matching(&self, name: &str) -> Vec<Arc<Dispatch>> {
        let subscriptions = self.inner.subscriptions.lock();
        let exact = subscriptions
            .iter()
            .filter(|s| matches!(&s.selector, Selector::Exact(exact) if exact == name));
        let patterns = subscriptions
            .iter()
            .filter(|s| s.selector.is_pattern() && s.selector.matches(name));
        exact
            .chain(patterns)
            .map(|s| Arc::clone(&s.handler))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.inner.subscriptions.lock().len())
            .field("observers", &self.inner.observers.lock().len())
            .field("max_depth", &self.inner.max_depth)
            .finish_non_exhaustive()
    }
}

/// Tracks emission nesting on the current thread; the count drops again
/// when the guard does.
struct DepthGuard {
    bus_id: u64,
}

impl DepthGuard {
    fn enter(inner: &BusInner, event: &str) -> Result<Self, BusError> {
        let previous = DISPATCH_DEPTH.with_borrow_mut(|depths| {
            let depth = depths.entry(inner.bus_id).or_insert(0);
            let previous = *depth;
            if previous < inner.max_depth {
                *depth += 1;
            }
            previous
        });
        if previous >= inner.max_depth {
            tracing::warn!(event, limit = inner.max_depth, "dispatch depth exceeded");
            return Err(BusError::DispatchDepthExceeded {
                event: event.to_string(),
                limit: inner.max_depth,
            });
        }
        Ok(Self {
            bus_id: inner.bus_id,
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with_borrow_mut(|depths| {
            if let Some(depth) = depths.get_mut(&self.bus_id) {
                *depth -= 1;
                if *depth == 0 {
                    depths.remove(&self.bus_id);
                }
            }
        });
    }
}
