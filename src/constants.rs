//! Centralized constants for the hydration reminder
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// REMINDER SCHEDULE
// ============================================================================

/// Default reminder interval when no config exists (45 minutes).
/// Unit: milliseconds
/// Recommended range: 15-120 minutes
pub const REMINDER_INTERVAL_DEFAULT_MS: u64 = 45 * 60 * 1000;

/// Smallest interval the scheduler will arm, prevents runaway re-triggering.
/// Unit: milliseconds
/// Range: Fixed minimum
pub const REMINDER_INTERVAL_MIN_MS: u64 = 1000;

/// Default jitter ceiling added on top of the interval (0 = no jitter).
/// Unit: milliseconds
/// Recommended range: 0-3600000
pub const RANDOM_OFFSET_DEFAULT_MS: u64 = 0;

/// Accepted interval override range (CLI and HYDRATION_INTERVAL_MINUTES).
/// Unit: minutes
pub const INTERVAL_MIN_MINUTES: u64 = 1;
pub const INTERVAL_MAX_MINUTES: u64 = 24 * 60;

/// Largest jitter override accepted from HYDRATION_JITTER_SECONDS.
/// Unit: seconds
pub const JITTER_MAX_SECONDS: u64 = 3600;

// ============================================================================
// OVERLAY LIFECYCLE
// ============================================================================

/// Default auto-hide delay, counted from the moment the overlay is shown.
/// Unit: milliseconds
/// Recommended range: 5000-60000
pub const AUTO_HIDE_DEFAULT_MS: u64 = 15 * 1000;

/// Delay before the launch preview reminder is shown.
/// Unit: milliseconds
pub const PREVIEW_DELAY_DEFAULT_MS: u64 = 2000;

/// Countdown label refresh period.
/// Unit: milliseconds
/// Range: Fixed, the countdown text has one-second resolution
pub const COUNTDOWN_REFRESH_MS: u64 = 1000;

/// Accepted auto-hide override range (CLI and HYDRATION_AUTO_HIDE_SECONDS).
/// Unit: seconds
pub const AUTO_HIDE_MIN_SECONDS: u64 = 1;
pub const AUTO_HIDE_MAX_SECONDS: u64 = 3600;

// ============================================================================
// SPRITE SEQUENCER
// ============================================================================

/// Default sprite frame advance period.
/// Unit: milliseconds
/// Recommended range: 50-1000
pub const ANIMATION_INTERVAL_DEFAULT_MS: u64 = 200;

/// Floor for the sprite frame advance period.
/// Unit: milliseconds
pub const ANIMATION_INTERVAL_MIN_MS: u64 = 10;

/// Highest frame index probed in an asset directory (`frame1.png` .. `frame24.png`).
pub const MAX_SPRITE_FRAMES: usize = 24;

/// Edge length of the drawn placeholder droplet.
/// Unit: pixels
pub const PLACEHOLDER_SIZE_PX: u32 = 120;

// ============================================================================
// TRANSITION ANIMATOR
// ============================================================================

/// Interpolation cadence while a transition is running (~60 fps).
/// Unit: milliseconds
pub const TRANSITION_FRAME_MS: u64 = 16;

/// Fade effect durations.
/// Unit: milliseconds
pub const FADE_ENTRY_MS: u64 = 280;
pub const FADE_EXIT_MS: u64 = 200;

/// Slide effect durations and vertical travel.
/// Unit: milliseconds / pixels
pub const SLIDE_ENTRY_MS: u64 = 320;
pub const SLIDE_EXIT_MS: u64 = 240;
pub const SLIDE_ENTRY_OFFSET_PX: i32 = 60;
pub const SLIDE_EXIT_OFFSET_PX: i32 = 80;

/// Pop effect durations and scale factor.
/// Unit: milliseconds / ratio
pub const POP_ENTRY_MS: u64 = 250;
pub const POP_EXIT_MS: u64 = 200;
pub const POP_SCALE: f64 = 0.9;

/// Smallest edge the pop effect shrinks to on entry and exit.
/// Unit: pixels
pub const POP_ENTRY_MIN_EDGE_PX: i32 = 40;
pub const POP_EXIT_MIN_EDGE_PX: i32 = 20;

// ============================================================================
// PLACEMENT & APPEARANCE
// ============================================================================

/// Default distance between overlay and the anchored screen edges.
/// Unit: pixels
pub const MARGIN_DEFAULT_PX: u32 = 16;

/// Default overlay extent.
/// Unit: pixels
pub const OVERLAY_WIDTH_DEFAULT_PX: u32 = 360;
pub const OVERLAY_HEIGHT_DEFAULT_PX: u32 = 180;

/// Overlay extent floor, keeps the reminder legible.
/// Unit: pixels
pub const OVERLAY_WIDTH_MIN_PX: u32 = 180;
pub const OVERLAY_HEIGHT_MIN_PX: u32 = 120;

/// Opacity bounds for overlay and text.
/// Unit: ratio (0.0-1.0)
pub const OPACITY_MIN: f64 = 0.1;
pub const OPACITY_MAX: f64 = 1.0;

/// Screen extent assumed when no monitor information is available.
/// Unit: pixels
pub const FALLBACK_SCREEN_WIDTH_PX: u32 = 1920;
pub const FALLBACK_SCREEN_HEIGHT_PX: u32 = 1080;
