//! # Notification Channel
//!
//! Typed observer channel between a producer (sequencer, director) and the
//! presentation collaborators that react to it.
//!
//! Listeners never see the producer's internal state, only the events it
//! emits. Two subscription styles are offered:
//! - Callbacks (`subscribe`), invoked synchronously inside `emit`
//! - Mailboxes (`mailbox`), queues the owner drains when convenient
//!
//! Everything runs on the caller's thread; delivery follows subscription order.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Handle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

enum Sink<E> {
    Callback(Box<dyn FnMut(&E)>),
    Mailbox(Rc<RefCell<VecDeque<E>>>),
}

/// Typed observer channel.
pub struct Notifier<E> {
    next_id: u64,
    sinks: Vec<(SubscriptionId, Sink<E>)>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            sinks: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

impl<E: Clone> Notifier<E> {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.push(Sink::Callback(Box::new(listener)))
    }

    /// Register a queue listener and return the receiving end.
    pub fn mailbox(&mut self) -> Mailbox<E> {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let id = self.push(Sink::Mailbox(Rc::clone(&queue)));
        Mailbox { id, queue }
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sid, _)| *sid != id);
        self.sinks.len() != before
    }

    /// Deliver an event to every subscriber.
    pub fn emit(&mut self, event: &E) {
        for (_, sink) in &mut self.sinks {
            match sink {
                Sink::Callback(listener) => listener(event),
                Sink::Mailbox(queue) => queue.borrow_mut().push_back(event.clone()),
            }
        }
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    fn push(&mut self, sink: Sink<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.sinks.push((id, sink));
        id
    }
}

/// Receiving end of a queue subscription.
#[derive(Debug)]
pub struct Mailbox<E> {
    id: SubscriptionId,
    queue: Rc<RefCell<VecDeque<E>>>,
}

impl<E> Mailbox<E> {
    /// The subscription this mailbox belongs to.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<E> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
