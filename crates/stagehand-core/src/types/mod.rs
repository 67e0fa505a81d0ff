//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the sequencer:
//! - The clock unit (`Millis`)
//! - Hook failure type (`HookError`)
//! - Error types (`StagehandError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` so they can key `BTreeMap`s
//! - Use checked or saturating arithmetic on the clock

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CLOCK UNIT
// =============================================================================

/// Milliseconds on a monotonic clock.
///
/// Used both for points in time (relative to whatever origin the driver
/// picked) and for spans between them. The core never reads a clock itself;
/// every time-dependent operation receives `now` as a `Millis`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    /// Zero milliseconds.
    pub const ZERO: Self = Self(0);

    /// Create a new value.
    #[must_use]
    pub const fn new(ms: u64) -> Self {
        Self(ms)
    }

    /// Convert a signed millisecond count, rejecting negative values.
    ///
    /// `stage` names the owner of the delay for the error message.
    pub fn from_signed(stage: &str, delay_ms: i64) -> Result<Self, StagehandError> {
        u64::try_from(delay_ms)
            .map(Self)
            .map_err(|_| StagehandError::NegativeDelay {
                stage: stage.to_string(),
                delay_ms,
            })
    }

    /// Checked addition. `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction (clamps at zero).
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Get the raw millisecond count.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{}ms", self.0))
    }
}

impl From<u64> for Millis {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error returned by a stage hook.
///
/// Hooks own their failure type; the sequencer only carries it back to the
/// caller of `advance`.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the Stagehand system.
///
/// - Configuration errors surface at construction, never at schedule time
/// - Hook failures are passed through untouched, never retried
/// - The core never panics
#[derive(Debug, Error)]
pub enum StagehandError {
    /// A sequencer was constructed without any stages.
    #[error("Stage sequence is empty")]
    EmptySequence,

    /// Two stages share the same name.
    #[error("Duplicate stage name: {0}")]
    DuplicateStage(String),

    /// A stage delay was negative.
    #[error("Negative delay for stage '{stage}': {delay_ms}ms")]
    NegativeDelay {
        /// The stage (or timer) the delay belongs to.
        stage: String,
        /// The rejected value.
        delay_ms: i64,
    },

    /// The cumulative offset of a stage does not fit the clock.
    #[error("Cumulative delay overflows at stage '{0}'")]
    DelayOverflow(String),

    /// `start` was called on a sequencer that is not in `NotStarted`.
    #[error("Sequence already started")]
    AlreadyStarted,

    /// A stage's `on_enter` hook failed.
    #[error("Hook for stage '{stage}' failed: {source}")]
    Hook {
        /// Name of the stage whose hook failed.
        stage: String,
        /// The hook's own error.
        #[source]
        source: HookError,
    },

    /// A configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// TESTS
// =============================================================================
