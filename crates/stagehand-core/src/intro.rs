//! # Intro Choreography
//!
//! The loading intro: the logo drops in, expands, spins and explodes, then
//! the overlay clears, the hero content fades in and the navigation bar
//! slides down.
//!
//! ## Timeline (defaults, ms from start)
//!
//! | Time | What happens |
//! |------|--------------|
//! | 500  | `logo_drop` |
//! | 1000 | `logo_expand` |
//! | 1600 | `logo_spin` |
//! | 2000 | `explosion` |
//! | 2800 | `overlay_dismissed`, sequence complete |
//! | 3000 | content revealed (complete + 200) |
//! | 4000 | navigation revealed (complete + 1200) |
//! | 4000 | fallback: navigation revealed if nothing else did |
//!
//! When the grace reveal and the fallback land on the same tick, the grace
//! reveal is processed first and the fallback is reported as suppressed.

use crate::fallback::{FallbackTimer, RevealSource};
use crate::notify::{Mailbox, Notifier, SubscriptionId};
use crate::page::PageController;
use crate::sequence::{ScheduledStage, SequenceEvent, SequencePhase, Stage, StageSequencer};
use crate::timer::TimerQueue;
use crate::{Millis, StagehandError};
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGES
// =============================================================================

/// Stages of the intro, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroStage {
    LogoDrop,
    LogoExpand,
    LogoSpin,
    Explosion,
    OverlayDismissed,
}

impl IntroStage {
    /// Every stage, in activation order.
    pub const ALL: [IntroStage; 5] = [
        IntroStage::LogoDrop,
        IntroStage::LogoExpand,
        IntroStage::LogoSpin,
        IntroStage::Explosion,
        IntroStage::OverlayDismissed,
    ];

    /// Stage name used by the sequencer.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            IntroStage::LogoDrop => "logo_drop",
            IntroStage::LogoExpand => "logo_expand",
            IntroStage::LogoSpin => "logo_spin",
            IntroStage::Explosion => "explosion",
            IntroStage::OverlayDismissed => "overlay_dismissed",
        }
    }

    /// Apply the stage's visual change to the page.
    pub fn apply(&self, page: &mut PageController) {
        match self {
            IntroStage::LogoDrop => page.drop_logo(),
            IntroStage::LogoExpand => page.expand_logo(),
            IntroStage::LogoSpin => page.spin_logo(),
            IntroStage::Explosion => page.explode(),
            IntroStage::OverlayDismissed => page.dismiss_overlay(),
        }
    }
}

impl std::fmt::Display for IntroStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TIMINGS
// =============================================================================

/// Delays of the intro. Stage delays are relative to the previous stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroTimings {
    pub logo_drop: Millis,
    pub logo_expand: Millis,
    pub logo_spin: Millis,
    pub explosion: Millis,
    pub overlay_dismissed: Millis,
    /// Content reveal, after the sequence completes.
    pub content_grace: Millis,
    /// Navigation reveal, after the sequence completes.
    pub navigation_grace: Millis,
    /// Unconditional navigation reveal, from the start.
    pub fallback: Millis,
}

impl Default for IntroTimings {
    fn default() -> Self {
        Self {
            logo_drop: Millis(500),
            logo_expand: Millis(500),
            logo_spin: Millis(600),
            explosion: Millis(400),
            overlay_dismissed: Millis(800),
            content_grace: Millis(200),
            navigation_grace: Millis(1200),
            fallback: Millis(4000),
        }
    }
}

impl IntroTimings {
    /// Delay of a stage relative to the previous one.
    #[must_use]
    pub fn delay_of(&self, stage: IntroStage) -> Millis {
        match stage {
            IntroStage::LogoDrop => self.logo_drop,
            IntroStage::LogoExpand => self.logo_expand,
            IntroStage::LogoSpin => self.logo_spin,
            IntroStage::Explosion => self.explosion,
            IntroStage::OverlayDismissed => self.overlay_dismissed,
        }
    }

    /// Offset of the last stage from the start (saturating).
    #[must_use]
    pub fn sequence_duration(&self) -> Millis {
        IntroStage::ALL
            .iter()
            .fold(Millis::ZERO, |acc, stage| acc.saturating_add(self.delay_of(*stage)))
    }

    /// The fallback must land strictly after the sequence would complete.
    pub fn validate(&self) -> Result<(), StagehandError> {
        let duration = self.sequence_duration();
        if self.fallback <= duration {
            return Err(StagehandError::InvalidConfig(format!(
                "fallback ({}) must be greater than the sequence duration ({})",
                self.fallback, duration
            )));
        }
        Ok(())
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Notification emitted by the intro director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IntroEvent {
    /// An intro stage was applied to the page.
    StageEntered {
        stage: IntroStage,
        scheduled_at: Millis,
        fired_at: Millis,
    },
    /// The last stage was entered.
    SequenceComplete { at: Millis },
    /// Hero content became visible.
    ContentRevealed { at: Millis },
    /// Navigation became visible through `source`.
    NavigationRevealed { source: RevealSource, at: Millis },
    /// `source` fired after navigation was already visible; ignored.
    RevealSuppressed { source: RevealSource, at: Millis },
    /// The intro was torn down with `released` timers still pending.
    Cancelled { at: Millis, released: usize },
}

// =============================================================================
// DIRECTOR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraceTimer {
    Content,
    Navigation,
}

/// Runs the intro against a [`PageController`].
///
/// Owns the stage sequencer, the grace timers armed on completion and the
/// independent navigation fallback. Drivers call [`IntroDirector::advance`]
/// whenever [`IntroDirector::next_deadline`] has passed.
#[derive(Debug)]
pub struct IntroDirector {
    timings: IntroTimings,
    sequencer: StageSequencer<PageController>,
    sequence_events: Mailbox<SequenceEvent>,
    page: PageController,
    grace: TimerQueue<GraceTimer>,
    fallback: FallbackTimer,
    notifier: Notifier<IntroEvent>,
    cancelled: bool,
}

impl IntroDirector {
    /// Build a director for the given timings.
    pub fn new(timings: IntroTimings) -> Result<Self, StagehandError> {
        timings.validate()?;

        let stages: Vec<Stage<PageController>> = IntroStage::ALL
            .into_iter()
            .map(|stage| {
                Stage::new(
                    stage.name(),
                    timings.delay_of(stage),
                    move |page: &mut PageController, _| {
                        stage.apply(page);
                        Ok(())
                    },
                )
            })
            .collect();
        let mut sequencer = StageSequencer::new(stages)?;
        let sequence_events = sequencer.mailbox();

        Ok(Self {
            timings,
            sequencer,
            sequence_events,
            page: PageController::new(),
            grace: TimerQueue::new(),
            fallback: FallbackTimer::new(),
            notifier: Notifier::new(),
            cancelled: false,
        })
    }

    /// The timings this director runs with.
    #[must_use]
    pub fn timings(&self) -> &IntroTimings {
        &self.timings
    }

    /// Stage schedule relative to the start.
    #[must_use]
    pub fn plan(&self) -> Vec<ScheduledStage> {
        self.sequencer.plan()
    }

    /// Start the sequence and arm the fallback at `now`.
    pub fn start(&mut self, now: Millis) -> Result<(), StagehandError> {
        self.sequencer.start(now)?;
        self.fallback.arm(now, self.timings.fallback);
        Ok(())
    }

    /// Process everything due at or before `now`, in chronological order.
    pub fn advance(&mut self, now: Millis) -> Result<(), StagehandError> {
        while let Some(at) = self.next_deadline().filter(|at| *at <= now) {
            self.step(at, now)?;
        }
        Ok(())
    }

    /// Tear the intro down: release the sequence, grace and fallback timers.
    ///
    /// Returns false on repeated calls and once the intro has played out
    /// (sequence complete, nothing pending).
    pub fn cancel(&mut self, now: Millis) -> bool {
        if self.cancelled
            || (self.sequence_phase() == SequencePhase::Complete && self.is_settled())
        {
            return false;
        }
        self.cancelled = true;

        let mut released = self.sequencer.pending();
        self.sequencer.cancel(now);
        self.sequence_events.drain();
        released = released.saturating_add(self.grace.clear());
        if self.fallback.disarm() {
            released = released.saturating_add(1);
        }

        self.notifier
            .emit(&IntroEvent::Cancelled { at: now, released });
        true
    }

    /// Earliest pending deadline across the sequence, grace and fallback timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        [
            self.sequencer.next_deadline(),
            self.grace.next_deadline(),
            self.fallback.pending_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// True when nothing is left to fire.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.next_deadline().is_none()
    }

    /// True once `cancel` has run.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Lifecycle state of the underlying sequence.
    #[must_use]
    pub fn sequence_phase(&self) -> SequencePhase {
        self.sequencer.phase()
    }

    /// The page being driven.
    #[must_use]
    pub fn page(&self) -> &PageController {
        &self.page
    }

    /// Mutable access for scroll, pointer and menu updates.
    pub fn page_mut(&mut self) -> &mut PageController {
        &mut self.page
    }

    /// Register a callback listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&IntroEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    /// Register a queue listener.
    pub fn mailbox(&mut self) -> Mailbox<IntroEvent> {
        self.notifier.mailbox()
    }

    /// Handle everything due at `at`. `now` is the caller's clock and only
    /// feeds the stages' processing time.
    fn step(&mut self, at: Millis, now: Millis) -> Result<(), StagehandError> {
        let result = self.sequencer.advance_due(at, now, &mut self.page);
        self.relay_sequence_events();
        result?;

        while let Some(due) = self.grace.pop_due(at) {
            match due.payload {
                GraceTimer::Content => {
                    if self.page.show_content() {
                        self.notifier.emit(&IntroEvent::ContentRevealed { at });
                    }
                }
                GraceTimer::Navigation => self.reveal_navigation(RevealSource::Sequence, at),
            }
        }

        if self.fallback.poll(at) {
            self.reveal_navigation(RevealSource::Fallback, at);
        }
        Ok(())
    }

    fn relay_sequence_events(&mut self) {
        let mut last_scheduled = None;
        for event in self.sequence_events.drain() {
            match event {
                SequenceEvent::StageEntered(entry) => {
                    last_scheduled = Some(entry.scheduled_at);
                    if let Some(stage) = IntroStage::ALL.get(entry.index).copied() {
                        self.notifier.emit(&IntroEvent::StageEntered {
                            stage,
                            scheduled_at: entry.scheduled_at,
                            fired_at: entry.fired_at,
                        });
                    }
                }
                SequenceEvent::Complete { at: fired_at } => {
                    // Grace periods run from the scheduled completion.
                    let at = last_scheduled.unwrap_or(fired_at);
                    self.grace.schedule(
                        at.saturating_add(self.timings.content_grace),
                        GraceTimer::Content,
                    );
                    self.grace.schedule(
                        at.saturating_add(self.timings.navigation_grace),
                        GraceTimer::Navigation,
                    );
                    self.notifier.emit(&IntroEvent::SequenceComplete { at });
                }
                SequenceEvent::Cancelled { .. } => {}
            }
        }
    }

    fn reveal_navigation(&mut self, source: RevealSource, at: Millis) {
        let event = if self.page.reveal_navigation(source, at) {
            IntroEvent::NavigationRevealed { source, at }
        } else {
            IntroEvent::RevealSuppressed { source, at }
        };
        self.notifier.emit(&event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(director: &mut IntroDirector) {
        while let Some(at) = director.next_deadline() {
            director.advance(at).expect("advance");
        }
    }

    #[test]
    fn default_timeline_offsets() {
        let director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let offsets: Vec<u64> = director.plan().iter().map(|s| s.offset.as_u64()).collect();
        assert_eq!(offsets, vec![500, 1000, 1600, 2000, 2800]);
        assert_eq!(IntroTimings::default().sequence_duration(), Millis(2800));
    }

    #[test]
    fn fallback_not_after_sequence_rejected() {
        let timings = IntroTimings {
            fallback: Millis(2800),
            ..IntroTimings::default()
        };
        assert!(matches!(
            IntroDirector::new(timings),
            Err(StagehandError::InvalidConfig(_))
        ));
    }

    #[test]
    fn full_run_reveals_everything() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        run_to_end(&mut director);

        let page = director.page().state();
        assert!(page.intro.logo_dropped && page.intro.exploded);
        assert!(!page.overlay_visible);
        assert!(page.content_visible);
        assert_eq!(
            page.navigation.opened_by(),
            Some((RevealSource::Sequence, Millis(4000)))
        );
        assert_eq!(director.sequence_phase(), SequencePhase::Complete);

        let events = mailbox.drain();
        assert_eq!(
            events.last(),
            Some(&IntroEvent::RevealSuppressed {
                source: RevealSource::Fallback,
                at: Millis(4000)
            })
        );
        assert!(events.contains(&IntroEvent::ContentRevealed { at: Millis(3000) }));
    }

    #[test]
    fn large_jump_keeps_chronological_order() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(60_000)).expect("advance");

        let kinds: Vec<&'static str> = mailbox
            .drain()
            .iter()
            .map(|e| match e {
                IntroEvent::StageEntered { .. } => "stage",
                IntroEvent::SequenceComplete { .. } => "complete",
                IntroEvent::ContentRevealed { .. } => "content",
                IntroEvent::NavigationRevealed { .. } => "nav",
                IntroEvent::RevealSuppressed { .. } => "suppressed",
                IntroEvent::Cancelled { .. } => "cancelled",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "stage",
                "stage",
                "stage",
                "stage",
                "stage",
                "complete",
                "content",
                "nav",
                "suppressed"
            ]
        );
        assert!(director.is_settled());
    }

    #[test]
    fn late_advance_reports_processing_time() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(900)).expect("advance");

        assert_eq!(
            mailbox.drain(),
            vec![IntroEvent::StageEntered {
                stage: IntroStage::LogoDrop,
                scheduled_at: Millis(500),
                fired_at: Millis(900),
            }]
        );
    }

    #[test]
    fn late_completion_keeps_reveal_schedule() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(3500)).expect("advance");

        let events = mailbox.drain();
        assert!(events.contains(&IntroEvent::StageEntered {
            stage: IntroStage::OverlayDismissed,
            scheduled_at: Millis(2800),
            fired_at: Millis(3500),
        }));
        assert!(events.contains(&IntroEvent::SequenceComplete { at: Millis(2800) }));
        assert!(events.contains(&IntroEvent::ContentRevealed { at: Millis(3000) }));
        assert_eq!(director.next_deadline(), Some(Millis(4000)));
    }

    #[test]
    fn cancel_after_settling_is_noop() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(10_000)).expect("advance");
        assert!(director.is_settled());
        mailbox.drain();

        assert!(!director.cancel(Millis(10_000)));
        assert!(!director.is_cancelled());
        assert!(mailbox.is_empty());
        assert!(director.page().navigation_visible());
    }

    #[test]
    fn cancel_after_completion_releases_pending_reveals() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(2900)).expect("advance");
        assert_eq!(director.sequence_phase(), SequencePhase::Complete);

        assert!(director.cancel(Millis(2900)));
        assert_eq!(
            mailbox.drain().last(),
            Some(&IntroEvent::Cancelled {
                at: Millis(2900),
                released: 3
            })
        );
    }

    #[test]
    fn cancel_mid_intro_releases_timers() {
        let mut director = IntroDirector::new(IntroTimings::default()).expect("valid");
        let mailbox = director.mailbox();
        director.start(Millis(0)).expect("start");
        director.advance(Millis(1600)).expect("advance");

        assert!(director.cancel(Millis(1700)));
        assert!(!director.cancel(Millis(1800)));
        assert!(director.is_settled());
        director.advance(Millis(10_000)).expect("advance");

        let state = director.page().state();
        assert!(state.intro.logo_spinning);
        assert!(!state.intro.exploded);
        assert!(!director.page().navigation_visible());
        assert_eq!(
            mailbox.drain().last(),
            Some(&IntroEvent::Cancelled {
                at: Millis(1700),
                released: 3
            })
        );
    }
}
