/// Broadcast of dispatch events to any number of observers.
///
/// Clones share one subscriber list. Sends never block: every subscriber gets
/// an unbounded channel, and a subscriber whose receiver is gone is dropped on
/// the next publish.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;

use super::events::DispatchEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

#[derive(Default)]
struct Shared {
    subscribers: RwLock<Vec<(SubscriberId, Sender<DispatchEvent>)>>,
    next_id: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> (Receiver<DispatchEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        self.shared.subscribers.write().push((id, tx));
        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.shared.subscribers.write().retain(|(sid, _)| *sid != id);
    }

    /// Send `event` to every live subscriber.
    pub fn publish(&self, event: DispatchEvent) {
        let closed: Vec<SubscriberId> = {
            let subscribers = self.shared.subscribers.read();
            if subscribers.is_empty() {
                return;
            }
            tracing::trace!("Publishing: {}", event.description());

            subscribers
                .iter()
                .filter(|(_, tx)| matches!(tx.try_send(event.clone()), Err(TrySendError::Disconnected(_))))
                .map(|(id, _)| *id)
                .collect()
        };

        if !closed.is_empty() {
            tracing::debug!("Dropping {} closed event subscriber(s)", closed.len());
            self.shared
                .subscribers
                .write()
                .retain(|(id, _)| !closed.contains(id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }

    pub fn clear(&self) {
        self.shared.subscribers.write().clear();
    }
}
