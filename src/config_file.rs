//! Persisted reminder configuration
//!
//! This module handles loading and saving the configuration snapshot stored
//! in config.toml. Loading is lenient per field: a wrong-typed or out-of-range
//! value is replaced by its default and the rest of the file still applies.

use crate::animation::EffectKind;
use crate::constants::*;
use crate::geometry::Extent;
use crate::monitor::{Anchor, MonitorSelector};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "hydration-reminder";

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Immutable configuration snapshot handed to every engine component.
///
/// A new snapshot replaces the old one as a whole (see `apply_config` on the
/// controller); nothing mutates a snapshot in place after it is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    // Timing
    pub reminder_interval_ms: u64,
    pub random_offset_ms: u64,
    pub auto_hide_ms: u64,
    pub animation_interval_ms: u64,
    pub show_preview_on_launch: bool,
    pub preview_delay_ms: u64,

    // Placement
    pub position: Anchor,
    pub margin_x: u32,
    pub margin_y: u32,
    pub overlay_width: u32,
    pub overlay_height: u32,
    pub monitor_id: MonitorSelector,

    // Appearance
    pub overlay_opacity: f64,
    pub text_opacity: f64,
    pub background_radius: u32,
    pub title_font_size: u32,
    pub message_font_size: u32,
    pub countdown_font_size: u32,

    // Text
    pub title_text: String,
    pub message_template: String,
    pub countdown_enabled: bool,
    pub countdown_template: String,

    // Animation
    pub animation_enabled: bool,
    pub entry_animation: EffectKind,
    pub asset_directory: PathBuf,

    // Colors
    pub gradient_top: Rgba,
    pub gradient_bottom: Rgba,
    pub border_color: Rgba,
    pub shadow_color: Rgba,
    pub title_color: Rgba,
    pub text_color: Rgba,
    pub countdown_color: Rgba,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            reminder_interval_ms: REMINDER_INTERVAL_DEFAULT_MS,
            random_offset_ms: RANDOM_OFFSET_DEFAULT_MS,
            auto_hide_ms: AUTO_HIDE_DEFAULT_MS,
            animation_interval_ms: ANIMATION_INTERVAL_DEFAULT_MS,
            show_preview_on_launch: true,
            preview_delay_ms: PREVIEW_DELAY_DEFAULT_MS,

            position: Anchor::BottomRight,
            margin_x: MARGIN_DEFAULT_PX,
            margin_y: MARGIN_DEFAULT_PX,
            overlay_width: OVERLAY_WIDTH_DEFAULT_PX,
            overlay_height: OVERLAY_HEIGHT_DEFAULT_PX,
            monitor_id: MonitorSelector::Auto,

            overlay_opacity: 1.0,
            text_opacity: 0.95,
            background_radius: 24,
            title_font_size: 22,
            message_font_size: 14,
            countdown_font_size: 12,

            title_text: "Hydration break".to_string(),
            message_template: "It's time to take a sip of water.\nEvery {interval}".to_string(),
            countdown_enabled: true,
            countdown_template: "Next reminder in {remaining}.".to_string(),

            animation_enabled: true,
            entry_animation: EffectKind::Fade,
            asset_directory: ReminderConfig::default_asset_dir(),

            gradient_top: Rgba::new(28, 116, 235, 235),
            gradient_bottom: Rgba::new(80, 170, 255, 235),
            border_color: Rgba::new(255, 255, 255, 200),
            shadow_color: Rgba::new(0, 0, 0, 90),
            title_color: Rgba::new(255, 255, 255, 255),
            text_color: Rgba::new(235, 238, 245, 255),
            countdown_color: Rgba::new(255, 255, 255, 255),
        }
    }
}

impl ReminderConfig {
    /// Directory holding config.toml and the assets folder
    ///
    /// - macOS: `~/Library/Application Support/hydration-reminder`
    /// - Linux: `~/.config/hydration-reminder`
    /// - Windows: `%APPDATA%\hydration-reminder`
    pub fn storage_dir() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::storage_dir().join("config.toml")
    }

    pub fn default_asset_dir() -> PathBuf {
        Self::storage_dir().join("assets")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.reminder_interval_ms)
    }

    pub fn jitter_ceiling(&self) -> Duration {
        Duration::from_millis(self.random_offset_ms)
    }

    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }

    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_delay_ms)
    }

    /// Sprite tick period, floored at ANIMATION_INTERVAL_MIN_MS
    pub fn animation_period(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms.max(ANIMATION_INTERVAL_MIN_MS))
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.overlay_width, self.overlay_height)
    }

    /// Reminder message with `{interval}` filled in
    pub fn message(&self) -> String {
        crate::utils::render_message(&self.message_template, self.reminder_interval_ms)
    }

    /// Whether interval or jitter differ, i.e. the pending schedule is stale
    pub fn timing_differs(&self, other: &ReminderConfig) -> bool {
        self.reminder_interval_ms != other.reminder_interval_ms
            || self.random_offset_ms != other.random_offset_ms
    }

    /// Build a config from a parsed TOML table, defaulting each bad field
    pub fn from_table(table: &toml::Table) -> Self {
        let d = Self::default();
        let config = Self {
            reminder_interval_ms: field(table, "reminder_interval_ms", d.reminder_interval_ms),
            random_offset_ms: field(table, "random_offset_ms", d.random_offset_ms),
            auto_hide_ms: field(table, "auto_hide_ms", d.auto_hide_ms),
            animation_interval_ms: field(table, "animation_interval_ms", d.animation_interval_ms),
            show_preview_on_launch: field(table, "show_preview_on_launch", d.show_preview_on_launch),
            preview_delay_ms: field(table, "preview_delay_ms", d.preview_delay_ms),

            position: field(table, "position", d.position),
            margin_x: field(table, "margin_x", d.margin_x),
            margin_y: field(table, "margin_y", d.margin_y),
            overlay_width: field(table, "overlay_width", d.overlay_width),
            overlay_height: field(table, "overlay_height", d.overlay_height),
            monitor_id: field(table, "monitor_id", d.monitor_id.clone()),

            overlay_opacity: field(table, "overlay_opacity", d.overlay_opacity),
            text_opacity: field(table, "text_opacity", d.text_opacity),
            background_radius: field(table, "background_radius", d.background_radius),
            title_font_size: field(table, "title_font_size", d.title_font_size),
            message_font_size: field(table, "message_font_size", d.message_font_size),
            countdown_font_size: field(table, "countdown_font_size", d.countdown_font_size),

            title_text: field(table, "title_text", d.title_text.clone()),
            message_template: field(table, "message_template", d.message_template.clone()),
            countdown_enabled: field(table, "countdown_enabled", d.countdown_enabled),
            countdown_template: field(table, "countdown_template", d.countdown_template.clone()),

            animation_enabled: field(table, "animation_enabled", d.animation_enabled),
            entry_animation: field(table, "entry_animation", d.entry_animation),
            asset_directory: field(table, "asset_directory", d.asset_directory.clone()),

            gradient_top: field(table, "gradient_top", d.gradient_top),
            gradient_bottom: field(table, "gradient_bottom", d.gradient_bottom),
            border_color: field(table, "border_color", d.border_color),
            shadow_color: field(table, "shadow_color", d.shadow_color),
            title_color: field(table, "title_color", d.title_color),
            text_color: field(table, "text_color", d.text_color),
            countdown_color: field(table, "countdown_color", d.countdown_color),
        };
        config.sanitized()
    }

    /// Replace out-of-range values with their defaults
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        if self.overlay_width < OVERLAY_WIDTH_MIN_PX {
            warn!(
                "overlay_width {} below minimum {}, using default",
                self.overlay_width, OVERLAY_WIDTH_MIN_PX
            );
            self.overlay_width = d.overlay_width;
        }
        if self.overlay_height < OVERLAY_HEIGHT_MIN_PX {
            warn!(
                "overlay_height {} below minimum {}, using default",
                self.overlay_height, OVERLAY_HEIGHT_MIN_PX
            );
            self.overlay_height = d.overlay_height;
        }
        if !(OPACITY_MIN..=OPACITY_MAX).contains(&self.overlay_opacity) {
            warn!(
                "overlay_opacity {} outside {}-{}, using default",
                self.overlay_opacity, OPACITY_MIN, OPACITY_MAX
            );
            self.overlay_opacity = d.overlay_opacity;
        }
        if !(OPACITY_MIN..=OPACITY_MAX).contains(&self.text_opacity) {
            warn!(
                "text_opacity {} outside {}-{}, using default",
                self.text_opacity, OPACITY_MIN, OPACITY_MAX
            );
            self.text_opacity = d.text_opacity;
        }
        self
    }

    /// Load config from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Config file doesn't exist
    /// - Failed to read file
    /// - The file is not valid TOML at all
    ///
    /// Individual bad fields are not errors, they fall back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Configuration file not found at: {}", path.display());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let table: toml::Table = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(Self::from_table(&table))
    }

    /// Load config, falling back to defaults on any failure.
    ///
    /// The boolean is true when no config file existed yet (first run).
    pub fn load_or_default(path: &Path) -> (Self, bool) {
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return (Self::default(), true);
        }

        match Self::load_from_path(path) {
            Ok(config) => {
                info!("Configuration loaded from: {}", path.display());
                (config, false)
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                (Self::default(), false)
            }
        }
    }

    /// Save config to standard location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path())
    }

    /// Save config to `path`, creating the parent directory if needed
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

/// Deserialize one key, or warn and fall back to `default`
fn field<T: DeserializeOwned>(table: &toml::Table, key: &str, default: T) -> T {
    let Some(value) = table.get(key) else {
        return default;
    };
    match value.clone().try_into::<T>() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "Invalid value for '{}' in config file ({}). Using default.",
                key,
                e.to_string().trim()
            );
            default
        }
    }
}
