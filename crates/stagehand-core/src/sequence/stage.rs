//! # Stage Definitions
//!
//! A stage is one named, timed step of a sequence. Its delay is relative to
//! the previous stage; the sequencer turns those delays into fixed offsets
//! from the start time.

use crate::{HookError, Millis, StagehandError};
use serde::{Deserialize, Serialize};

/// Hook invoked when a stage activates.
///
/// The context `C` is the state the hook is allowed to touch (for example a
/// page controller). It is lent by the caller of `advance` for the duration
/// of the call.
pub type StageHook<C> = Box<dyn FnMut(&mut C, &StageEntry) -> Result<(), HookError>>;

/// A single step in a sequence.
pub struct Stage<C> {
    name: String,
    delay: Millis,
    on_enter: StageHook<C>,
}

impl<C> Stage<C> {
    /// Create a stage activating `delay` after the previous one.
    pub fn new(
        name: impl Into<String>,
        delay: Millis,
        on_enter: impl FnMut(&mut C, &StageEntry) -> Result<(), HookError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            delay,
            on_enter: Box::new(on_enter),
        }
    }

    /// Create a stage from a signed delay, rejecting negative values.
    pub fn try_new(
        name: impl Into<String>,
        delay_ms: i64,
        on_enter: impl FnMut(&mut C, &StageEntry) -> Result<(), HookError> + 'static,
    ) -> Result<Self, StagehandError> {
        let name = name.into();
        let delay = Millis::from_signed(&name, delay_ms)?;
        Ok(Self::new(name, delay, on_enter))
    }

    /// A stage with a no-op hook. Useful when only the notification matters.
    pub fn marker(name: impl Into<String>, delay: Millis) -> Self {
        Self::new(name, delay, |_, _| Ok(()))
    }

    /// The stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delay relative to the previous stage.
    #[must_use]
    pub fn delay(&self) -> Millis {
        self.delay
    }

    pub(crate) fn enter(&mut self, ctx: &mut C, entry: &StageEntry) -> Result<(), HookError> {
        (self.on_enter)(ctx, entry)
    }
}

impl<C> std::fmt::Debug for Stage<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Record of a stage activation, handed to the hook and to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    /// Position in the sequence.
    pub index: usize,
    /// Stage name.
    pub name: String,
    /// Absolute time the stage was scheduled for (start + offset).
    pub scheduled_at: Millis,
    /// Time passed to the `advance` call that fired it.
    pub fired_at: Millis,
}

impl StageEntry {
    /// How late the activation was processed relative to its schedule.
    #[must_use]
    pub fn lag(&self) -> Millis {
        self.fired_at.saturating_sub(self.scheduled_at)
    }
}

/// A stage with its absolute offset from the sequence start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledStage {
    /// Position in the sequence.
    pub index: usize,
    /// Stage name.
    pub name: String,
    /// Delay relative to the previous stage.
    pub delay: Millis,
    /// Cumulative offset from the start.
    pub offset: Millis,
}
