//! Publish/subscribe event distribution.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::error::BusError;
use crate::ports::EventHandler;

/// Ordered broadcaster of events to subscribed handlers.
///
/// Handlers are notified in subscription order. The same handler may be
/// subscribed more than once and is then notified once per registration.
/// Delivery is not isolated: the first handler error stops delivery of that
/// event and is returned from [`notify`](Self::notify).
pub struct EventBus<E> {
    handlers: Mutex<Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E> EventBus<E> {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Appends a handler to the registry.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler<E>>) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Removes the first registration of `handler`.
    ///
    /// Handlers are matched by identity (the same `Arc` allocation).
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotFound`] if `handler` is not subscribed.
    pub fn unsubscribe(&self, handler: &Arc<dyn EventHandler<E>>) -> Result<(), BusError> {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        let position = handlers
            .iter()
            .position(|h| same_handler(h, handler))
            .ok_or(BusError::NotFound)?;
        handlers.remove(position);
        Ok(())
    }

    /// Delivers `event` to every subscribed handler in order.
    ///
    /// The registry is snapshotted first, so handlers may subscribe or
    /// unsubscribe during delivery; changes apply from the next event.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Handler`] with the first handler failure. Handlers
    /// after the failing one do not see the event.
    pub fn notify(&self, event: &E) -> Result<(), BusError> {
        let snapshot: Vec<Arc<dyn EventHandler<E>>> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        trace!("Notifying {} handler(s)", snapshot.len());

        for handler in snapshot {
            handler.handle(event).map_err(BusError::Handler)?;
        }
        Ok(())
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_handler<E>(a: &Arc<dyn EventHandler<E>>, b: &Arc<dyn EventHandler<E>>) -> bool {
    // Compare data pointers only; vtable pointers may differ between codegen units.
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}
