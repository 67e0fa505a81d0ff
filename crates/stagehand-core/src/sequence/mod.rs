//! # Sequence Module
//!
//! Stage definitions and the sequencer that drives them against a fixed
//! start time.

mod sequencer;
mod stage;

pub use sequencer::*;
pub use stage::*;
