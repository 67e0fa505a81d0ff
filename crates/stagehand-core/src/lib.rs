//! # stagehand-core
//!
//! Deterministic timed stage sequencing - THE LOGIC.
//!
//! A [`StageSequencer`] owns an ordered list of named stages, schedules each
//! one at a fixed offset from the start time, fires their hooks strictly in
//! order and announces every transition on a typed notification channel.
//! Around it sit the pieces a loading intro needs: independent fallback
//! timers, a first-wins reveal gate, and an explicit page controller that
//! owns the UI state the hooks change.
//!
//! ## Architectural Constraints
//!
//! - No async, no I/O, no clock: callers pass the current time as [`Millis`]
//! - Single-threaded: hooks and listeners run inside the caller's `advance`
//! - Integer arithmetic only; timers ordered with `BTreeMap`
//!
//! ## Example
//!
//! ```
//! use stagehand_core::{Millis, Stage, StageSequencer};
//!
//! let stages = ["drop", "spin"]
//!     .into_iter()
//!     .zip([500, 600])
//!     .map(|(name, delay)| {
//!         Stage::new(name, Millis(delay), |log: &mut Vec<String>, entry| {
//!             log.push(entry.name.clone());
//!             Ok(())
//!         })
//!     })
//!     .collect();
//! let mut sequencer = StageSequencer::new(stages).expect("valid stages");
//! let mut log = Vec::new();
//!
//! sequencer.start(Millis(0)).expect("start");
//! sequencer.advance(Millis(1100), &mut log).expect("advance");
//! assert_eq!(log, vec!["drop", "spin"]);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod fallback;
pub mod intro;
pub mod notify;
pub mod page;
pub mod scroll;
pub mod sequence;
pub mod timer;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{HookError, Millis, StagehandError};

// =============================================================================
// RE-EXPORTS: Sequencing
// =============================================================================

pub use notify::{Mailbox, Notifier, SubscriptionId};
pub use sequence::{
    ScheduledStage, SequenceEvent, SequencePhase, SequenceState, Stage, StageEntry, StageHook,
    StageSequencer,
};
pub use timer::{Due, TimerId, TimerQueue};

// =============================================================================
// RE-EXPORTS: Presentation Collaborators
// =============================================================================

pub use fallback::{FallbackTimer, RevealGate, RevealSource};
pub use intro::{IntroDirector, IntroEvent, IntroStage, IntroTimings};
pub use page::{PageController, PageState, ScrollRequest, Section, SectionLayout};
pub use scroll::{Debouncer, ParallaxTracker, Reveal, ScrollReveal};
