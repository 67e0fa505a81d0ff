//! # Configuration
//!
//! Intro timings loaded from a TOML file.
//!
//! ```toml
//! [intro]
//! logo_drop_ms = 500
//! logo_expand_ms = 500
//! logo_spin_ms = 600
//! explosion_ms = 400
//! overlay_dismissed_ms = 800
//! content_grace_ms = 200
//! navigation_grace_ms = 1200
//! fallback_ms = 4000
//! ```
//!
//! Every key is optional and falls back to the built-in intro. Values are
//! read as signed integers so that negative delays are reported as such
//! instead of as a type error.

use serde::Deserialize;
use stagehand_core::{IntroTimings, Millis, StagehandError};
use std::path::Path;

/// Top-level layout of a configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub intro: IntroSection,
}

/// The `[intro]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntroSection {
    pub logo_drop_ms: i64,
    pub logo_expand_ms: i64,
    pub logo_spin_ms: i64,
    pub explosion_ms: i64,
    pub overlay_dismissed_ms: i64,
    pub content_grace_ms: i64,
    pub navigation_grace_ms: i64,
    pub fallback_ms: i64,
}

impl Default for IntroSection {
    fn default() -> Self {
        let t = IntroTimings::default();
        Self {
            logo_drop_ms: t.logo_drop.as_u64() as i64,
            logo_expand_ms: t.logo_expand.as_u64() as i64,
            logo_spin_ms: t.logo_spin.as_u64() as i64,
            explosion_ms: t.explosion.as_u64() as i64,
            overlay_dismissed_ms: t.overlay_dismissed.as_u64() as i64,
            content_grace_ms: t.content_grace.as_u64() as i64,
            navigation_grace_ms: t.navigation_grace.as_u64() as i64,
            fallback_ms: t.fallback.as_u64() as i64,
        }
    }
}

impl IntroSection {
    /// Convert to validated timings.
    pub fn into_timings(self) -> Result<IntroTimings, StagehandError> {
        let timings = IntroTimings {
            logo_drop: Millis::from_signed("logo_drop", self.logo_drop_ms)?,
            logo_expand: Millis::from_signed("logo_expand", self.logo_expand_ms)?,
            logo_spin: Millis::from_signed("logo_spin", self.logo_spin_ms)?,
            explosion: Millis::from_signed("explosion", self.explosion_ms)?,
            overlay_dismissed: Millis::from_signed("overlay_dismissed", self.overlay_dismissed_ms)?,
            content_grace: Millis::from_signed("content_grace", self.content_grace_ms)?,
            navigation_grace: Millis::from_signed("navigation_grace", self.navigation_grace_ms)?,
            fallback: Millis::from_signed("fallback", self.fallback_ms)?,
        };
        timings.validate()?;
        Ok(timings)
    }
}

/// Parse and validate configuration text.
pub fn parse(text: &str) -> Result<IntroTimings, StagehandError> {
    let file: ConfigFile =
        toml::from_str(text).map_err(|e| StagehandError::SerializationError(e.to_string()))?;
    file.intro.into_timings()
}

/// Load timings from `path`, or the built-in intro when no path is given.
pub fn load(path: Option<&Path>) -> Result<IntroTimings, StagehandError> {
    let Some(path) = path else {
        return Ok(IntroTimings::default());
    };

    let text = std::fs::read_to_string(path).map_err(|e| {
        StagehandError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
    })?;
    let timings = parse(&text)?;
    tracing::debug!(path = %path.display(), "loaded intro configuration");
    Ok(timings)
}

// =============================================================================
// TESTS
// =============================================================================
