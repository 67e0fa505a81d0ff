//! # Timer Queue
//!
//! Pending timers keyed by absolute deadline.
//!
//! The queue never looks at a clock. Drivers ask for [`TimerQueue::next_deadline`],
//! wait (for real or on a simulated clock), and then pop everything that is
//! due with [`TimerQueue::pop_due`]. Timers with equal deadlines pop in the
//! order they were scheduled.

use crate::Millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A timer popped from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due<T> {
    /// The handle returned by `schedule`.
    pub id: TimerId,
    /// The absolute time the timer was scheduled for.
    pub deadline: Millis,
    /// The payload passed to `schedule`.
    pub payload: T,
}

/// Ordered set of pending timers.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: BTreeMap<(Millis, TimerId), T>,
    deadlines: BTreeMap<TimerId, Millis>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to become due at `at`.
    pub fn schedule(&mut self, at: Millis, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.insert((at, id), payload);
        self.deadlines.insert(id, at);
        id
    }

    /// Cancel a pending timer, returning its payload if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let at = self.deadlines.remove(&id)?;
        self.pending.remove(&(at, id))
    }

    /// Drop every pending timer. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.pending.len();
        self.pending.clear();
        self.deadlines.clear();
        released
    }

    /// Pop the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Due<T>> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let payload = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some(Due {
            id,
            deadline,
            payload,
        })
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.first_key_value().map(|(&(at, _), _)| at)
    }

    /// Deadline of a specific pending timer.
    #[must_use]
    pub fn deadline_of(&self, id: TimerId) -> Option<Millis> {
        self.deadlines.get(&id).copied()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Millis(300), "c");
        queue.schedule(Millis(100), "a");
        queue.schedule(Millis(200), "b");

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(Millis(1000)))
            .map(|due| due.payload)
            .collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_deadlines_pop_fifo() {
        let mut queue = TimerQueue::new();
        queue.schedule(Millis(50), 1);
        queue.schedule(Millis(50), 2);
        queue.schedule(Millis(50), 3);

        assert_eq!(queue.pop_due(Millis(50)).map(|d| d.payload), Some(1));
        assert_eq!(queue.pop_due(Millis(50)).map(|d| d.payload), Some(2));
        assert_eq!(queue.pop_due(Millis(50)).map(|d| d.payload), Some(3));
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(Millis(500), ());
        assert!(queue.pop_due(Millis(499)).is_none());
        assert_eq!(queue.next_deadline(), Some(Millis(500)));
        assert!(queue.pop_due(Millis(500)).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_removes_timer() {
        let mut queue = TimerQueue::new();
        let keep = queue.schedule(Millis(10), "keep");
        let drop = queue.schedule(Millis(5), "drop");

        assert_eq!(queue.cancel(drop), Some("drop"));
        assert_eq!(queue.cancel(drop), None);
        assert_eq!(queue.deadline_of(keep), Some(Millis(10)));
        assert_eq!(queue.next_deadline(), Some(Millis(10)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn clear_reports_released_count() {
        let mut queue = TimerQueue::new();
        queue.schedule(Millis(1), ());
        queue.schedule(Millis(2), ());
        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.clear(), 0);
        assert_eq!(queue.next_deadline(), None);
    }
}
