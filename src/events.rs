//! Typed signal/subscription primitives.
//!
//! Components expose `on_changed` / `on_new_job` style registration built on
//! [`Signal`]. Handlers stay connected for as long as the returned
//! [`Subscription`] is alive; dropping it disconnects the handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;
type HandlerList<T> = Arc<Mutex<Vec<(u64, Handler<T>)>>>;

/// A broadcast signal carrying values of type `T`.
///
/// Emission clones the handler list before invoking, so handlers may freely
/// connect or disconnect (including dropping their own subscription) while an
/// emission is in progress.
pub struct Signal<T> {
    handlers: HandlerList<T>,
    next_id: AtomicU64,
}

impl<T: 'static> Signal<T> {
    /// Create a signal with no connected handlers.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Connect a handler. The handler is invoked on every `emit` until the
    /// returned subscription is dropped.
    pub fn connect(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().push((id, Arc::new(handler)));

        let weak: Weak<Mutex<Vec<(u64, Handler<T>)>>> = Arc::downgrade(&self.handlers);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(handlers) = weak.upgrade() {
                    handlers.lock().retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }

    /// Invoke every connected handler with `value`.
    pub fn emit(&self, value: &T) {
        // Snapshot so handlers can (dis)connect during dispatch.
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in snapshot {
            handler(value);
        }
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected signal handler. Dropping it disconnects the handler.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Leave the handler connected for the lifetime of the signal.
    pub fn detach(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
