//! # Stagehand CLI Module
//!
//! This module implements the CLI interface for Stagehand.
//!
//! ## Available Commands
//!
//! - `plan` - Show the absolute intro schedule
//! - `simulate` - Run the intro on a virtual clock
//! - `play` - Run the intro in real time (Ctrl-C tears it down)
//! - `check` - Validate a configuration file

mod commands;

use clap::{Parser, Subcommand};
use stagehand_core::StagehandError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Stagehand - timed intro choreography runner
///
/// Runs the staged loading intro (logo drop, expand, spin, explosion,
/// reveal) with fixed-start scheduling and a navigation fallback.
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the absolute intro schedule
    Plan,

    /// Run the intro on a virtual clock and print the timeline
    Simulate {
        /// Stop once the clock passes this many milliseconds
        #[arg(short, long)]
        until: Option<u64>,

        /// Tear the intro down at this many milliseconds
        #[arg(long)]
        cancel_at: Option<u64>,

        /// Advance in fixed steps (ms) instead of jumping to each deadline
        #[arg(short, long)]
        step: Option<u64>,
    },

    /// Run the intro in real time
    Play {
        /// Tear the intro down after this many milliseconds
        #[arg(long)]
        cancel_after: Option<u64>,
    },

    /// Validate a configuration file
    Check,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), StagehandError> {
    let config = cli.config.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Plan) | None => cmd_plan(config, json_mode),
        Some(Commands::Simulate {
            until,
            cancel_at,
            step,
        }) => cmd_simulate(config, json_mode, cli.verbose, until, cancel_at, step),
        Some(Commands::Play { cancel_after }) => {
            cmd_play(config, json_mode, cli.verbose, cancel_after).await
        }
        Some(Commands::Check) => cmd_check(config, json_mode),
    }
}
