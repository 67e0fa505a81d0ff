//! # Drivers
//!
//! Two ways of feeding time into an [`IntroDirector`]:
//! - [`run_virtual`]: a simulated clock, jumping straight to each deadline
//! - [`run_realtime`]: tokio timers against the wall clock, torn down on
//!   Ctrl-C or after an optional limit
//!
//! Both log every intro event through `tracing` and return the full timeline.

use serde::Serialize;
use stagehand_core::{
    IntroDirector, IntroEvent, IntroTimings, Millis, PageState, SequencePhase, StagehandError,
};
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a driven intro.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Every event, in emission order.
    pub events: Vec<IntroEvent>,
    /// Page state when the run stopped.
    pub page: PageState,
    /// Sequence state when the run stopped.
    pub phase: SequencePhase,
    /// Clock value when the run stopped.
    pub stopped_at: Millis,
    /// True if the run ended through teardown.
    pub cancelled: bool,
}

/// Knobs for the simulated clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualOptions {
    /// Stop once the clock passes this point.
    pub until: Option<Millis>,
    /// Tear the intro down at this point.
    pub cancel_at: Option<Millis>,
    /// Advance in fixed steps instead of jumping to each deadline.
    pub step: Option<Millis>,
}

/// Log one intro event with structured fields.
pub fn log_event(event: &IntroEvent) {
    match event {
        IntroEvent::StageEntered {
            stage,
            scheduled_at,
            fired_at,
        } => tracing::info!(
            stage = %stage,
            scheduled_at = scheduled_at.as_u64(),
            fired_at = fired_at.as_u64(),
            "stage entered"
        ),
        IntroEvent::SequenceComplete { at } => {
            tracing::info!(at = at.as_u64(), "intro sequence complete");
        }
        IntroEvent::ContentRevealed { at } => {
            tracing::info!(at = at.as_u64(), "content revealed");
        }
        IntroEvent::NavigationRevealed { source, at } => {
            tracing::info!(source = %source, at = at.as_u64(), "navigation revealed");
        }
        IntroEvent::RevealSuppressed { source, at } => {
            tracing::debug!(source = %source, at = at.as_u64(), "duplicate reveal ignored");
        }
        IntroEvent::Cancelled { at, released } => {
            tracing::warn!(at = at.as_u64(), released, "intro torn down");
        }
    }
}

fn report(director: &IntroDirector, events: Vec<IntroEvent>, stopped_at: Millis) -> RunReport {
    RunReport {
        events,
        page: director.page().state().clone(),
        phase: director.sequence_phase(),
        stopped_at,
        cancelled: director.is_cancelled(),
    }
}

// =============================================================================
// VIRTUAL CLOCK
// =============================================================================

/// Run the intro on a simulated clock starting at zero.
pub fn run_virtual(
    timings: IntroTimings,
    options: VirtualOptions,
) -> Result<RunReport, StagehandError> {
    let mut director = IntroDirector::new(timings)?;
    let mailbox = director.mailbox();
    let mut events = Vec::new();
    let mut now = Millis::ZERO;

    // A teardown scheduled after the stop point never happens.
    let cancel_at = options
        .cancel_at
        .filter(|c| options.until.is_none_or(|u| *c <= u));

    director.start(now)?;

    while let Some(deadline) = director.next_deadline() {
        let next = match options.step {
            Some(step) if step > Millis::ZERO => now.saturating_add(step),
            _ => deadline,
        };

        if let Some(cancel_at) = cancel_at.filter(|c| *c <= next) {
            director.advance(cancel_at)?;
            director.cancel(cancel_at);
            now = cancel_at;
            break;
        }
        if let Some(until) = options.until.filter(|u| *u < next) {
            director.advance(until)?;
            now = until;
            break;
        }

        director.advance(next)?;
        now = next;
        for event in mailbox.drain() {
            log_event(&event);
            events.push(event);
        }
    }

    // The intro settled before the requested stop point.
    if let Some(until) = options
        .until
        .filter(|u| *u > now && !director.is_cancelled())
    {
        director.advance(until)?;
        now = until;
    }

    for event in mailbox.drain() {
        log_event(&event);
        events.push(event);
    }
    Ok(report(&director, events, now))
}

// =============================================================================
// REAL TIME
// =============================================================================

fn elapsed(origin: Instant) -> Millis {
    Millis(origin.elapsed().as_millis() as u64)
}

/// Resolves when the intro should be torn down.
async fn teardown_signal(limit: Option<Duration>) {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Ctrl-C handler unavailable; only the time limit can stop the intro");
            std::future::pending::<()>().await;
        }
    };

    match limit {
        Some(limit) => {
            tokio::select! {
                () = tokio::time::sleep(limit) => {}
                () = ctrl_c => {}
            }
        }
        None => ctrl_c.await,
    }
}

/// Run the intro against tokio's clock.
///
/// Each wake-up is computed from the fixed start instant, so scheduling
/// jitter never accumulates.
pub async fn run_realtime(
    timings: IntroTimings,
    limit: Option<Duration>,
) -> Result<RunReport, StagehandError> {
    let mut director = IntroDirector::new(timings)?;
    let mailbox = director.mailbox();
    let mut events = Vec::new();

    let origin = Instant::now();
    director.start(Millis::ZERO)?;
    tracing::info!(fallback = timings.fallback.as_u64(), "intro started");

    let teardown = teardown_signal(limit);
    tokio::pin!(teardown);

    while let Some(deadline) = director.next_deadline() {
        let wake = origin + Duration::from_millis(deadline.as_u64());
        tokio::select! {
            () = tokio::time::sleep_until(wake) => {
                director.advance(elapsed(origin).max(deadline))?;
            }
            () = &mut teardown => {
                director.cancel(elapsed(origin));
            }
        }

        for event in mailbox.drain() {
            log_event(&event);
            events.push(event);
        }
        if director.is_cancelled() {
            break;
        }
    }

    Ok(report(&director, events, elapsed(origin)))
}

// =============================================================================
// TESTS
// =============================================================================
