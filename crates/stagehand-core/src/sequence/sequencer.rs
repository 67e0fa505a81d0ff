//! # Stage Sequencer
//!
//! Drives a strictly ordered, timed progression through named stages.
//!
//! ## Scheduling
//!
//! Every stage is scheduled at `start + cumulative offset` when the sequence
//! starts. Activation times never depend on when a previous hook actually
//! ran, so a late `advance` call cannot push later stages back.
//!
//! ## State machine
//!
//! ```text
//! NotStarted ──start──▶ Running(-) ──▶ Running(0) ──▶ … ──▶ Running(N-1) ──▶ Complete
//!      │                    │               │                    │
//!      └────────────────────┴─────cancel────┴────────────────────┴──▶ Cancelled
//! ```
//!
//! `Complete` and `Cancelled` are terminal. Only [`StageSequencer::reset`]
//! leaves them, and it goes back to `NotStarted`.

use super::stage::{ScheduledStage, Stage, StageEntry};
use crate::notify::{Mailbox, Notifier, SubscriptionId};
use crate::timer::TimerQueue;
use crate::{Millis, StagehandError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// STATE
// =============================================================================

/// Coarse lifecycle state of a sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencePhase {
    /// `start` has not been called.
    NotStarted,
    /// Started; `current` is the last stage entered, if any.
    Running { current: Option<usize> },
    /// The last stage has been entered.
    Complete,
    /// `cancel` was called before completion.
    Cancelled,
}

impl SequencePhase {
    /// True for `Complete` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

/// Run-time record of a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    /// Index of the last stage entered. `None` before the first one.
    pub current_index: Option<usize>,
    /// When `start` was called.
    pub started_at: Option<Millis>,
    /// Set by `cancel`; no hook runs once it is true.
    pub cancelled: bool,
}

/// Notification emitted by a sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SequenceEvent {
    /// A stage's hook ran successfully.
    StageEntered(StageEntry),
    /// The last stage was entered. Emitted once.
    Complete { at: Millis },
    /// The sequence was cancelled with `pending` activations released.
    Cancelled { at: Millis, pending: usize },
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Timed stage sequencer over a hook context `C`.
pub struct StageSequencer<C> {
    stages: Vec<Stage<C>>,
    offsets: Vec<Millis>,
    timers: TimerQueue<usize>,
    state: SequenceState,
    complete: bool,
    notifier: Notifier<SequenceEvent>,
}

impl<C> StageSequencer<C> {
    /// Create a sequencer over a fixed stage list.
    ///
    /// Fails on an empty list, duplicate names, or cumulative delays that
    /// overflow the clock. Nothing is scheduled until `start`.
    pub fn new(stages: Vec<Stage<C>>) -> Result<Self, StagehandError> {
        if stages.is_empty() {
            return Err(StagehandError::EmptySequence);
        }

        let mut names = BTreeSet::new();
        let mut offsets = Vec::with_capacity(stages.len());
        let mut offset = Millis::ZERO;
        for stage in &stages {
            if !names.insert(stage.name()) {
                return Err(StagehandError::DuplicateStage(stage.name().to_string()));
            }
            offset = offset
                .checked_add(stage.delay())
                .ok_or_else(|| StagehandError::DelayOverflow(stage.name().to_string()))?;
            offsets.push(offset);
        }

        Ok(Self {
            stages,
            offsets,
            timers: TimerQueue::new(),
            state: SequenceState::default(),
            complete: false,
            notifier: Notifier::new(),
        })
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: construction rejects empty sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Offset of the last stage from the start.
    #[must_use]
    pub fn total_duration(&self) -> Millis {
        self.offsets.last().copied().unwrap_or_default()
    }

    /// The schedule relative to the start time.
    #[must_use]
    pub fn plan(&self) -> Vec<ScheduledStage> {
        self.stages
            .iter()
            .zip(&self.offsets)
            .enumerate()
            .map(|(index, (stage, &offset))| ScheduledStage {
                index,
                name: stage.name().to_string(),
                delay: stage.delay(),
                offset,
            })
            .collect()
    }

    /// Start the sequence at `now`.
    ///
    /// Errors with `AlreadyStarted` unless the sequencer is in `NotStarted`
    /// (a cancelled sequencer must be `reset` first).
    pub fn start(&mut self, now: Millis) -> Result<(), StagehandError> {
        if self.phase() != SequencePhase::NotStarted {
            return Err(StagehandError::AlreadyStarted);
        }

        let mut deadlines = Vec::with_capacity(self.stages.len());
        for (stage, offset) in self.stages.iter().zip(&self.offsets) {
            let at = now
                .checked_add(*offset)
                .ok_or_else(|| StagehandError::DelayOverflow(stage.name().to_string()))?;
            deadlines.push(at);
        }

        for (index, at) in deadlines.into_iter().enumerate() {
            self.timers.schedule(at, index);
        }
        self.state.started_at = Some(now);
        Ok(())
    }

    /// Fire every stage whose scheduled time is `<= now`, in index order.
    ///
    /// Returns how many stages were entered. A failing hook aborts the call
    /// with `StagehandError::Hook`; the failed stage is consumed and the
    /// remaining stages stay scheduled for the next call.
    pub fn advance(&mut self, now: Millis, ctx: &mut C) -> Result<usize, StagehandError> {
        self.advance_due(now, now, ctx)
    }

    /// Fire every stage scheduled at or before `due_by`, recording `now` as
    /// the processing time.
    ///
    /// Lets a caller that interleaves other timers walk deadlines one at a
    /// time while still reporting how late each stage was handled.
    pub fn advance_due(
        &mut self,
        due_by: Millis,
        now: Millis,
        ctx: &mut C,
    ) -> Result<usize, StagehandError> {
        let mut entered = 0usize;

        while !self.state.cancelled {
            let Some(due) = self.timers.pop_due(due_by) else {
                break;
            };
            let index = due.payload;
            let Some(stage) = self.stages.get_mut(index) else {
                continue;
            };

            let entry = StageEntry {
                index,
                name: stage.name().to_string(),
                scheduled_at: due.deadline,
                fired_at: now,
            };
            stage
                .enter(ctx, &entry)
                .map_err(|source| StagehandError::Hook {
                    stage: entry.name.clone(),
                    source,
                })?;

            self.state.current_index = Some(index);
            entered = entered.saturating_add(1);
            self.notifier.emit(&SequenceEvent::StageEntered(entry));

            if index.saturating_add(1) == self.stages.len() {
                self.complete = true;
                self.notifier.emit(&SequenceEvent::Complete { at: now });
            }
        }

        Ok(entered)
    }

    /// Cancel the sequence and release every pending activation.
    ///
    /// Idempotent. Returns false (and does nothing) if the sequence was
    /// already cancelled or complete.
    pub fn cancel(&mut self, now: Millis) -> bool {
        if self.state.cancelled || self.complete {
            return false;
        }
        self.state.cancelled = true;
        let pending = self.timers.clear();
        self.notifier
            .emit(&SequenceEvent::Cancelled { at: now, pending });
        true
    }

    /// Return to `NotStarted`, dropping pending timers. Subscriptions survive.
    pub fn reset(&mut self) {
        self.timers.clear();
        self.state = SequenceState::default();
        self.complete = false;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn phase(&self) -> SequencePhase {
        if self.state.cancelled {
            SequencePhase::Cancelled
        } else if self.complete {
            SequencePhase::Complete
        } else if self.state.started_at.is_none() {
            SequencePhase::NotStarted
        } else {
            SequencePhase::Running {
                current: self.state.current_index,
            }
        }
    }

    /// The run-time record.
    #[must_use]
    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// When the next pending stage is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Number of stages still scheduled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Register a callback listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&SequenceEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    /// Register a queue listener.
    pub fn mailbox(&mut self) -> Mailbox<SequenceEvent> {
        self.notifier.mailbox()
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

impl<C> std::fmt::Debug for StageSequencer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSequencer")
            .field("stages", &self.stages)
            .field("state", &self.state)
            .field("phase", &self.phase())
            .field("pending", &self.timers.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
