//! Event handler port for bus subscribers.

/// A subscriber to an [`EventBus`](crate::bus::EventBus).
pub trait EventHandler<E>: Send + Sync {
    /// Handles one published event.
    ///
    /// # Errors
    ///
    /// An error aborts delivery of this event to later subscribers and is
    /// returned to the publisher.
    fn handle(&self, event: &E) -> anyhow::Result<()>;
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, event: &E) -> anyhow::Result<()> {
        self(event)
    }
}
