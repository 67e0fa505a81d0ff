//! # Fallback Reveals
//!
//! A fallback timer fires on its own schedule whether or not the primary
//! notification path delivered. A [`RevealGate`] sits behind both paths and
//! lets exactly one of them through.
//!
//! ## Deduplication Policy
//!
//! First path to fire wins. Whichever of the sequence path or the fallback
//! reaches the gate first opens it and is recorded as authoritative; the
//! other becomes a no-op.

use crate::Millis;
use serde::{Deserialize, Serialize};

// =============================================================================
// FALLBACK TIMER
// =============================================================================

/// Independent one-shot timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackTimer {
    deadline: Option<Millis>,
    fired: bool,
}

impl FallbackTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `start`. Re-arming resets `fired`.
    pub fn arm(&mut self, start: Millis, delay: Millis) {
        self.deadline = Some(start.saturating_add(delay));
        self.fired = false;
    }

    /// Disarm without firing. Returns true if it was armed and pending.
    pub fn disarm(&mut self) -> bool {
        let was_pending = self.deadline.is_some() && !self.fired;
        self.deadline = None;
        was_pending
    }

    /// Returns true exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if !self.fired && now >= deadline => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }

    /// Deadline while the timer is still pending.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Millis> {
        self.deadline.filter(|_| !self.fired)
    }

    /// The armed deadline, fired or not.
    #[must_use]
    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// True once the timer has fired.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.fired
    }
}

// =============================================================================
// REVEAL GATE
// =============================================================================

/// Which path asked for a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealSource {
    /// The sequence's completion notification (plus its grace delay).
    Sequence,
    /// The independent fallback timer.
    Fallback,
}

impl std::fmt::Display for RevealSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// First-wins latch for a reveal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealGate {
    opened: Option<(RevealSource, Millis)>,
}

impl RevealGate {
    /// Create a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to open the gate. Returns false if another path already did.
    pub fn open(&mut self, source: RevealSource, at: Millis) -> bool {
        if self.opened.is_some() {
            return false;
        }
        self.opened = Some((source, at));
        true
    }

    /// True once any path has opened the gate.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened.is_some()
    }

    /// The winning path and when it fired.
    #[must_use]
    pub fn opened_by(&self) -> Option<(RevealSource, Millis)> {
        self.opened
    }
}

// =============================================================================
// TESTS
// =============================================================================
