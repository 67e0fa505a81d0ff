//! # Page Controller
//!
//! Explicit owner of the page's UI state: what the intro overlay shows,
//! whether content and navigation are visible, which section is active,
//! the menu, the header's scrolled styling and the custom cursor.
//!
//! The controller is plain data plus an update API, so every transition
//! can be tested without a rendering environment. Renderers read
//! [`PageController::state`] and never mutate it directly.

use crate::Millis;
use crate::fallback::{RevealGate, RevealSource};
use serde::{Deserialize, Serialize};

/// Scroll position is probed this far below the viewport top when picking
/// the active section.
pub const ACTIVE_SECTION_OFFSET: i64 = 100;

/// The header switches to its opaque style past this scroll position.
pub const SCROLLED_THRESHOLD: i64 = 50;

/// Half the custom cursor's edge length; the overlay is centred on the pointer.
pub const CURSOR_HALF_SIZE: i64 = 24;

// =============================================================================
// SECTIONS
// =============================================================================

/// Page sections in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Home,
    About,
    Events,
    Work,
    Team,
    Gallery,
}

impl Section {
    /// Every section, in document order.
    pub const ALL: [Section; 6] = [
        Section::Home,
        Section::About,
        Section::Events,
        Section::Work,
        Section::Team,
        Section::Gallery,
    ];

    /// Sections listed in the navigation menu.
    pub const NAVIGABLE: [Section; 5] = [
        Section::Home,
        Section::About,
        Section::Events,
        Section::Work,
        Section::Team,
    ];

    /// Anchor id of the section.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::About => "about",
            Section::Events => "events",
            Section::Work => "work",
            Section::Team => "team",
            Section::Gallery => "gallery",
        }
    }

    /// Menu label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::About => "About SFLML",
            Section::Events => "Event",
            Section::Work => "Our Work",
            Section::Team => "Meet Our Team",
            Section::Gallery => "Gallery",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

/// Vertical offsets of the sections that are currently laid out.
///
/// Sections missing from the layout are skipped, the way a missing anchor
/// element would be.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    tops: Vec<(Section, i64)>,
}

impl SectionLayout {
    /// Empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or move) a section.
    #[must_use]
    pub fn with(mut self, section: Section, top: i64) -> Self {
        self.tops.retain(|(s, _)| *s != section);
        self.tops.push((section, top));
        self.tops.sort_by_key(|(s, _)| *s);
        self
    }

    /// Top offset of a section, if laid out.
    #[must_use]
    pub fn top_of(&self, section: Section) -> Option<i64> {
        self.tops
            .iter()
            .find(|(s, _)| *s == section)
            .map(|&(_, top)| top)
    }

    /// Section under a scroll position: the last one (in document order)
    /// whose top is at or above `scroll_y + ACTIVE_SECTION_OFFSET`.
    #[must_use]
    pub fn section_at(&self, scroll_y: i64) -> Option<Section> {
        let probe = scroll_y.saturating_add(ACTIVE_SECTION_OFFSET);
        self.tops
            .iter()
            .rev()
            .find(|&&(_, top)| top <= probe)
            .map(|&(section, _)| section)
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Visual flags of the loading overlay's logo animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroVisuals {
    pub logo_dropped: bool,
    pub logo_expanded: bool,
    pub logo_spinning: bool,
    pub exploded: bool,
}

/// Custom cursor overlay position (top-left corner, in px).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: i64,
    pub y: i64,
}

/// Everything a renderer needs to draw the page chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub intro: IntroVisuals,
    pub overlay_visible: bool,
    pub content_visible: bool,
    pub navigation: RevealGate,
    pub menu_open: bool,
    pub scrolled: bool,
    pub active_section: Section,
    pub cursor: CursorPosition,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            intro: IntroVisuals::default(),
            overlay_visible: true,
            content_visible: false,
            navigation: RevealGate::new(),
            menu_open: false,
            scrolled: false,
            active_section: Section::Home,
            cursor: CursorPosition::default(),
        }
    }
}

/// A smooth-scroll request for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub section: Section,
    /// Target offset, if the section is laid out.
    pub top: Option<i64>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Single owner of the page's mutable UI state.
#[derive(Debug, Clone, Default)]
pub struct PageController {
    state: PageState,
}

impl PageController {
    /// Fresh page: overlay up, content and navigation hidden, `home` active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the state.
    #[must_use]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    // -------------------------------------------------------------------------
    // Intro overlay
    // -------------------------------------------------------------------------

    pub fn drop_logo(&mut self) {
        self.state.intro.logo_dropped = true;
    }

    pub fn expand_logo(&mut self) {
        self.state.intro.logo_expanded = true;
    }

    pub fn spin_logo(&mut self) {
        self.state.intro.logo_spinning = true;
    }

    pub fn explode(&mut self) {
        self.state.intro.exploded = true;
    }

    /// Remove the loading overlay.
    pub fn dismiss_overlay(&mut self) {
        self.state.overlay_visible = false;
    }

    /// Show the hero content. Returns false if it was already visible.
    pub fn show_content(&mut self) -> bool {
        !std::mem::replace(&mut self.state.content_visible, true)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Reveal the navigation bar. Only the first caller wins.
    pub fn reveal_navigation(&mut self, source: RevealSource, at: Millis) -> bool {
        self.state.navigation.open(source, at)
    }

    /// True once the navigation bar is visible.
    #[must_use]
    pub fn navigation_visible(&self) -> bool {
        self.state.navigation.is_open()
    }

    /// Flip the mobile menu. Returns the new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.state.menu_open = !self.state.menu_open;
        self.state.menu_open
    }

    pub fn close_menu(&mut self) {
        self.state.menu_open = false;
    }

    pub fn set_active_section(&mut self, section: Section) {
        self.state.active_section = section;
    }

    /// Navigate to a section: mark it active, close the menu and return the
    /// smooth-scroll target.
    pub fn scroll_to_section(&mut self, section: Section, layout: &SectionLayout) -> ScrollRequest {
        self.set_active_section(section);
        self.close_menu();
        ScrollRequest {
            section,
            top: layout.top_of(section),
        }
    }

    // -------------------------------------------------------------------------
    // Scroll & pointer
    // -------------------------------------------------------------------------

    /// Update the active section from a scroll position.
    ///
    /// Returns the new section if it changed. Leaves the state alone when no
    /// laid-out section is above the probe point.
    pub fn track_scroll(&mut self, scroll_y: i64, layout: &SectionLayout) -> Option<Section> {
        let section = layout.section_at(scroll_y)?;
        if section == self.state.active_section {
            return None;
        }
        self.state.active_section = section;
        Some(section)
    }

    /// Apply a (debounced) scroll position to the header style.
    pub fn set_scrolled(&mut self, scroll_y: i64) -> bool {
        self.state.scrolled = scroll_y > SCROLLED_THRESHOLD;
        self.state.scrolled
    }

    /// Move the custom cursor so it stays centred on the pointer.
    pub fn pointer_moved(&mut self, x: i64, y: i64) {
        self.state.cursor = CursorPosition {
            x: x.saturating_sub(CURSOR_HALF_SIZE),
            y: y.saturating_sub(CURSOR_HALF_SIZE),
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
