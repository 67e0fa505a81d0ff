//! # Scroll Effects
//!
//! Small state machines behind the page's scroll-driven effects:
//! - [`Debouncer`]: trailing debounce for noisy scroll positions
//! - [`ScrollReveal`]: trigger-once visibility tracking with staggered children
//! - [`ParallaxTracker`]: integer parallax offsets from the scroll position
//!
//! All rates are expressed in permille so no floating point is needed.

use crate::Millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Debounce applied to the header's scrolled flag.
pub const SCROLL_DEBOUNCE: Millis = Millis(150);

/// Delay between consecutive staggered children of a revealed element.
pub const STAGGER_STEP: Millis = Millis(100);

/// Background layers move against the scroll at this rate.
pub const BACKGROUND_RATE_PERMILLE: i64 = -300;

/// Base rate of floating elements; each further element adds `FLOATING_RATE_STEP_PERMILLE`.
pub const FLOATING_RATE_PERMILLE: i64 = 100;
pub const FLOATING_RATE_STEP_PERMILLE: i64 = 50;

// =============================================================================
// DEBOUNCER
// =============================================================================

/// Trailing debounce: only the last value pushed within the window survives.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Millis,
    pending: Option<(Millis, T)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(window: Millis) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a value, pushing the deadline back to `now + window`.
    pub fn push(&mut self, now: Millis, value: T) {
        self.pending = Some((now.saturating_add(self.window), value));
    }

    /// Yield the latest value once its window has elapsed quietly.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// When the pending value settles.
    #[must_use]
    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

// =============================================================================
// SCROLL REVEAL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Observed {
    threshold_percent: u8,
    children: usize,
    revealed: bool,
}

/// An element crossing its visibility threshold for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub element: String,
    pub at: Millis,
    /// When each staggered child should animate in.
    pub child_reveals: Vec<Millis>,
}

/// Trigger-once visibility tracking for elements.
#[derive(Debug, Clone, Default)]
pub struct ScrollReveal {
    elements: BTreeMap<String, Observed>,
}

impl ScrollReveal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing an element.
    ///
    /// `threshold_percent` is clamped to 100. `children` is the number of
    /// staggered child elements revealed after it.
    pub fn observe(&mut self, element: impl Into<String>, threshold_percent: u8, children: usize) {
        self.elements.insert(
            element.into(),
            Observed {
                threshold_percent: threshold_percent.min(100),
                children,
                revealed: false,
            },
        );
    }

    /// Stop observing every element.
    pub fn disconnect(&mut self) {
        self.elements.clear();
    }

    /// Report how much of an element is visible.
    ///
    /// Returns a `Reveal` the first time the element reaches its threshold
    /// with something visible; afterwards it stays revealed.
    pub fn update(&mut self, element: &str, visible_percent: u8, now: Millis) -> Option<Reveal> {
        let observed = self.elements.get_mut(element)?;
        if observed.revealed
            || visible_percent == 0
            || visible_percent < observed.threshold_percent
        {
            return None;
        }
        observed.revealed = true;

        let child_reveals = (0..observed.children as u64)
            .map(|i| now.saturating_add(Millis(STAGGER_STEP.as_u64().saturating_mul(i))))
            .collect();
        Some(Reveal {
            element: element.to_string(),
            at: now,
            child_reveals,
        })
    }

    /// True once an element has been revealed.
    #[must_use]
    pub fn is_revealed(&self, element: &str) -> bool {
        self.elements.get(element).is_some_and(|o| o.revealed)
    }
}

// =============================================================================
// PARALLAX
// =============================================================================

/// Offsets to apply for one scroll position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallaxFrame {
    pub background: i64,
    pub floating: Vec<i64>,
}

/// Parallax offsets, skipping updates that moved by a pixel or less.
#[derive(Debug, Clone, Default)]
pub struct ParallaxTracker {
    floating_elements: usize,
    last_scroll: i64,
}

impl ParallaxTracker {
    #[must_use]
    pub fn new(floating_elements: usize) -> Self {
        Self {
            floating_elements,
            last_scroll: 0,
        }
    }

    /// Compute a new frame if the scroll position moved by more than 1px.
    pub fn update(&mut self, scrolled: i64) -> Option<ParallaxFrame> {
        if scrolled.saturating_sub(self.last_scroll).abs() <= 1 {
            return None;
        }
        self.last_scroll = scrolled;

        let floating = (0..self.floating_elements as i64)
            .map(|i| {
                let rate = FLOATING_RATE_PERMILLE
                    .saturating_add(FLOATING_RATE_STEP_PERMILLE.saturating_mul(i));
                permille(scrolled, rate)
            })
            .collect();
        Some(ParallaxFrame {
            background: permille(scrolled, BACKGROUND_RATE_PERMILLE),
            floating,
        })
    }
}

fn permille(value: i64, rate: i64) -> i64 {
    value.saturating_mul(rate) / 1000
}

// =============================================================================
// TESTS
// =============================================================================
