//! # CLI Command Implementations
//!
//! Each command loads the intro timings (built-in or from `--config`),
//! runs the requested operation and prints either a human-readable table
//! or JSON.

use crate::config;
use crate::driver::{RunReport, VirtualOptions, run_realtime, run_virtual};
use serde::Serialize;
use stagehand_core::{IntroDirector, IntroEvent, IntroTimings, Millis, StagehandError};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// One-line description of an intro event.
pub fn describe(event: &IntroEvent) -> String {
    match event {
        IntroEvent::StageEntered {
            stage,
            scheduled_at,
            fired_at,
        } => {
            if fired_at > scheduled_at {
                format!("{:>7}  stage {} (processed at {})", scheduled_at, stage, fired_at)
            } else {
                format!("{:>7}  stage {}", scheduled_at, stage)
            }
        }
        IntroEvent::SequenceComplete { at } => format!("{:>7}  sequence complete", at),
        IntroEvent::ContentRevealed { at } => format!("{:>7}  content revealed", at),
        IntroEvent::NavigationRevealed { source, at } => {
            format!("{:>7}  navigation revealed ({})", at, source)
        }
        IntroEvent::RevealSuppressed { source, at } => {
            format!("{:>7}  {} reveal ignored, navigation already visible", at, source)
        }
        IntroEvent::Cancelled { at, released } => {
            format!("{:>7}  torn down, {} pending timer(s) released", at, released)
        }
    }
}

fn print_report(title: &str, report: &RunReport, json_mode: bool, verbose: bool) {
    if json_mode {
        print_json(report);
        return;
    }

    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    for event in &report.events {
        println!("{}", describe(event));
    }
    println!();
    println!("Stopped at: {}", report.stopped_at);
    println!("Sequence:   {:?}", report.phase);
    println!(
        "Navigation: {}",
        match report.page.navigation.opened_by() {
            Some((source, at)) => format!("visible since {} ({})", at, source),
            None => "hidden".to_string(),
        }
    );

    if verbose {
        println!();
        println!("Page state:");
        println!("  Overlay visible: {}", report.page.overlay_visible);
        println!("  Content visible: {}", report.page.content_visible);
        println!("  Logo dropped:    {}", report.page.intro.logo_dropped);
        println!("  Logo expanded:   {}", report.page.intro.logo_expanded);
        println!("  Logo spinning:   {}", report.page.intro.logo_spinning);
        println!("  Exploded:        {}", report.page.intro.exploded);
        println!("  Active section:  {}", report.page.active_section);
    }
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Show the absolute intro schedule.
pub fn cmd_plan(config: Option<&Path>, json_mode: bool) -> Result<(), StagehandError> {
    let timings = config::load(config)?;
    let director = IntroDirector::new(timings)?;
    let plan = director.plan();
    let complete = timings.sequence_duration();

    if json_mode {
        let output = serde_json::json!({
            "stages": plan,
            "sequence_duration": complete,
            "content_reveal": complete.saturating_add(timings.content_grace),
            "navigation_reveal": complete.saturating_add(timings.navigation_grace),
            "fallback": timings.fallback,
        });
        print_json(&output);
        return Ok(());
    }

    println!("Stagehand Intro Plan");
    println!("====================");
    println!("{:>3}  {:<20} {:>8} {:>8}", "#", "Stage", "Delay", "At");
    for stage in &plan {
        println!(
            "{:>3}  {:<20} {:>8} {:>8}",
            stage.index,
            stage.name,
            stage.delay.to_string(),
            stage.offset.to_string()
        );
    }
    println!();
    println!(
        "Content reveal:    {} (complete + {})",
        complete.saturating_add(timings.content_grace),
        timings.content_grace
    );
    println!(
        "Navigation reveal: {} (complete + {})",
        complete.saturating_add(timings.navigation_grace),
        timings.navigation_grace
    );
    println!("Fallback:          {}", timings.fallback);

    Ok(())
}

// =============================================================================
// SIMULATE COMMAND
// =============================================================================

/// Run the intro on a virtual clock.
pub fn cmd_simulate(
    config: Option<&Path>,
    json_mode: bool,
    verbose: bool,
    until: Option<u64>,
    cancel_at: Option<u64>,
    step: Option<u64>,
) -> Result<(), StagehandError> {
    let timings = config::load(config)?;
    let options = VirtualOptions {
        until: until.map(Millis),
        cancel_at: cancel_at.map(Millis),
        step: step.map(Millis),
    };

    let report = run_virtual(timings, options)?;
    print_report("Stagehand Simulation", &report, json_mode, verbose);
    Ok(())
}

// =============================================================================
// PLAY COMMAND
// =============================================================================

/// Run the intro in real time.
pub async fn cmd_play(
    config: Option<&Path>,
    json_mode: bool,
    verbose: bool,
    cancel_after: Option<u64>,
) -> Result<(), StagehandError> {
    let timings = config::load(config)?;
    if !json_mode {
        println!(
            "Playing intro ({} until fallback). Press Ctrl+C to tear down.",
            timings.fallback
        );
        println!();
    }

    let report = run_realtime(timings, cancel_after.map(Duration::from_millis)).await?;
    print_report("Stagehand Playback", &report, json_mode, verbose);
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a configuration file.
pub fn cmd_check(config: Option<&Path>, json_mode: bool) -> Result<(), StagehandError> {
    let path = config.ok_or_else(|| {
        StagehandError::InvalidConfig("no configuration file given (use --config)".to_string())
    })?;
    let timings: IntroTimings = config::load(Some(path))?;

    if json_mode {
        let output = serde_json::json!({
            "config": path.to_string_lossy(),
            "valid": true,
            "timings": timings,
            "sequence_duration": timings.sequence_duration(),
        });
        print_json(&output);
        return Ok(());
    }

    println!("Configuration OK: {}", path.display());
    println!("Sequence duration: {}", timings.sequence_duration());
    println!("Fallback:          {}", timings.fallback);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::{IntroStage, RevealSource};

    #[test]
    fn describe_marks_late_processing() {
        let on_time = IntroEvent::StageEntered {
            stage: IntroStage::LogoSpin,
            scheduled_at: Millis(1600),
            fired_at: Millis(1600),
        };
        let late = IntroEvent::StageEntered {
            stage: IntroStage::LogoSpin,
            scheduled_at: Millis(1600),
            fired_at: Millis(1650),
        };
        assert_eq!(describe(&on_time), " 1600ms  stage logo_spin");
        assert_eq!(
            describe(&late),
            " 1600ms  stage logo_spin (processed at 1650ms)"
        );
    }

    #[test]
    fn describe_reveals() {
        let event = IntroEvent::NavigationRevealed {
            source: RevealSource::Fallback,
            at: Millis(4000),
        };
        assert_eq!(describe(&event), " 4000ms  navigation revealed (fallback)");
    }

    #[test]
    fn check_requires_a_file() {
        assert!(matches!(
            cmd_check(None, false),
            Err(StagehandError::InvalidConfig(_))
        ));
    }
}
