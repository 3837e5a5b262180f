use tokio::sync::broadcast;

/// Signal that some stored record changed. Carries no payload; observers
/// re-read what they care about through the store's getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChanged;

const DEFAULT_CAPACITY: usize = 16;

/// Broadcast channel for [`StoreChanged`] signals.
#[derive(Debug, Clone)]
pub struct ProgressEvents {
    tx: broadcast::Sender<StoreChanged>,
}

impl ProgressEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A lagging receiver only loses duplicate signals, so a small buffer is enough.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Notify every current subscriber. Having none is fine.
    pub fn notify(&self) {
        let _ = self.tx.send(StoreChanged);
    }
}

impl Default for ProgressEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn notify_without_subscribers_is_harmless() {
        let events = ProgressEvents::new();
        events.notify();
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn every_subscriber_sees_the_signal() {
        let events = ProgressEvents::new();
        let mut a = events.subscribe();
        let mut b = events.subscribe();
        events.notify();

        assert_eq!(a.try_recv(), Ok(StoreChanged));
        assert_eq!(b.try_recv(), Ok(StoreChanged));
        assert_eq!(a.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn late_subscriber_misses_earlier_signals() {
        let events = ProgressEvents::new();
        events.notify();
        let mut rx = events.subscribe();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
