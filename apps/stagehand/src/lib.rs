//! # Stagehand
//!
//! Application layer around `stagehand-core`: configuration loading, the
//! virtual-clock and real-time drivers, and the CLI.

pub mod cli;
pub mod config;
pub mod driver;
