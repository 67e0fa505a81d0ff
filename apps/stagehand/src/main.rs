//! # Stagehand - Intro Choreography Runner
//!
//! The main binary for the stagehand timed stage sequencer.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/stagehand (THE BINARY)              │
//! │                                                           │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────┐   │
//! │  │    CLI      │   │   Config     │   │    Drivers    │   │
//! │  │   (clap)    │   │   (toml)     │   │ (tokio/virt.) │   │
//! │  └──────┬──────┘   └──────┬───────┘   └───────┬───────┘   │
//! │         └─────────────────┼───────────────────┘           │
//! │                           ▼                               │
//! │                  ┌─────────────────┐                      │
//! │                  │ stagehand-core  │                      │
//! │                  │  (THE LOGIC)    │                      │
//! │                  └─────────────────┘                      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! stagehand plan
//! stagehand simulate --cancel-at 2500
//! stagehand play --config intro.toml
//! stagehand check --config intro.toml
//! ```

use clap::Parser;
use stagehand::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // STAGEHAND_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("STAGEHAND_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stagehand=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌┬┐┌─┐┌─┐┌─┐┬ ┬┌─┐┌┐┌┌┬┐
  └─┐ │ ├─┤│ ┬├┤ ├─┤├─┤│││ ││
  └─┘ ┴ ┴ ┴└─┘└─┘┴ ┴┴ ┴┘└┘─┴┘

  Intro Choreography Runner v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
