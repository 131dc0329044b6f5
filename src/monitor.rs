//! Monitor selection and overlay placement
//!
//! Placement is a pure function of the chosen screen's usable area, the
//! overlay extent, the anchor corner and the margins. The result is always
//! clamped back onto the screen, so oversized margins or overlays degrade to
//! "pinned to the screen edge" instead of leaving the visible area.

use crate::geometry::{Extent, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Usable area of one monitor
pub type ScreenGeometry = Rect;

/// Screen corner used as the placement reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];

    pub fn is_right(self) -> bool {
        matches!(self, Anchor::TopRight | Anchor::BottomRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Anchor::BottomLeft | Anchor::BottomRight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top_left",
            Anchor::TopRight => "top_right",
            Anchor::BottomLeft => "bottom_left",
            Anchor::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid position '{}' (expected top_left, top_right, bottom_left or bottom_right)",
                    s
                )
            })
    }
}

/// Which monitor the overlay should appear on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonitorSelector {
    /// Follow the pointer, falling back to the primary monitor
    #[default]
    Auto,
    /// Monitor matched by name
    Named(String),
}

impl MonitorSelector {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            MonitorSelector::Auto
        } else {
            MonitorSelector::Named(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MonitorSelector::Auto => "auto",
            MonitorSelector::Named(name) => name,
        }
    }
}

impl Serialize for MonitorSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MonitorSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MonitorSelector::parse(&raw))
    }
}

/// One entry of the monitor enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub name: String,
    pub geometry: ScreenGeometry,
}

impl Monitor {
    pub fn new(name: impl Into<String>, geometry: ScreenGeometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}

/// Monitor enumeration service supplied by the windowing layer
pub trait MonitorProvider {
    fn monitors(&self) -> Vec<Monitor>;

    /// Monitor currently under the pointer, if the platform can tell
    fn monitor_under_pointer(&self) -> Option<Monitor>;

    /// Designated primary monitor
    fn primary(&self) -> Monitor;
}

/// Fixed monitor layout, used by the CLI and by tests
#[derive(Debug, Clone)]
pub struct StaticMonitors {
    monitors: Vec<Monitor>,
    pointer: Option<usize>,
}

impl StaticMonitors {
    /// `monitors[0]` is treated as primary. An empty list gets a single
    /// fallback screen so there is always somewhere to place the overlay.
    pub fn new(mut monitors: Vec<Monitor>) -> Self {
        if monitors.is_empty() {
            monitors.push(Monitor::new(
                "primary",
                Rect::new(
                    0,
                    0,
                    crate::constants::FALLBACK_SCREEN_WIDTH_PX,
                    crate::constants::FALLBACK_SCREEN_HEIGHT_PX,
                ),
            ));
        }
        Self {
            monitors,
            pointer: None,
        }
    }

    pub fn single(width: u32, height: u32) -> Self {
        Self::new(vec![Monitor::new("primary", Rect::new(0, 0, width, height))])
    }

    /// Mark the monitor at `index` as the one under the pointer
    pub fn with_pointer_on(mut self, index: usize) -> Self {
        self.pointer = (index < self.monitors.len()).then_some(index);
        self
    }
}

impl MonitorProvider for StaticMonitors {
    fn monitors(&self) -> Vec<Monitor> {
        self.monitors.clone()
    }

    fn monitor_under_pointer(&self) -> Option<Monitor> {
        self.pointer.map(|i| self.monitors[i].clone())
    }

    fn primary(&self) -> Monitor {
        self.monitors[0].clone()
    }
}

/// Pick the target monitor: explicit name, then pointer, then primary
pub fn select_monitor(selector: &MonitorSelector, provider: &dyn MonitorProvider) -> Monitor {
    if let MonitorSelector::Named(name) = selector {
        if let Some(monitor) = provider.monitors().into_iter().find(|m| &m.name == name) {
            return monitor;
        }
        warn!("Monitor '{}' not found, following the pointer instead", name);
    }

    if let Some(monitor) = provider.monitor_under_pointer() {
        return monitor;
    }

    provider.primary()
}

/// Top-left position of the overlay on `screen`.
///
/// Margins push the overlay inward from the anchored edges, then the result
/// is clamped to `[screen.x, screen.x + screen.width - overlay.width]` (same
/// for y). When the overlay is larger than the screen the clamp pins it to
/// the screen origin.
pub fn resolve(
    screen: &ScreenGeometry,
    overlay: Extent,
    anchor: Anchor,
    margin_x: u32,
    margin_y: u32,
) -> (i32, i32) {
    let sx = screen.x as i64;
    let sy = screen.y as i64;
    let sw = screen.width as i64;
    let sh = screen.height as i64;
    let ow = overlay.width as i64;
    let oh = overlay.height as i64;

    let x = if anchor.is_right() {
        sx + sw - ow - margin_x as i64
    } else {
        sx + margin_x as i64
    };
    let y = if anchor.is_bottom() {
        sy + sh - oh - margin_y as i64
    } else {
        sy + margin_y as i64
    };

    // max() last so an overlay wider than the screen lands on the origin
    let x = x.min(sx + sw - ow).max(sx);
    let y = y.min(sy + sh - oh).max(sy);

    debug!(
        "Resolved overlay position ({}, {}) on screen {:?} for {}",
        x, y, screen, anchor
    );
    (x as i32, y as i32)
}

/// Full placement rectangle for the overlay on the selected monitor
pub fn place(
    provider: &dyn MonitorProvider,
    selector: &MonitorSelector,
    overlay: Extent,
    anchor: Anchor,
    margin_x: u32,
    margin_y: u32,
) -> Rect {
    let monitor = select_monitor(selector, provider);
    let (x, y) = resolve(&monitor.geometry, overlay, anchor, margin_x, margin_y);
    Rect::new(x, y, overlay.width, overlay.height)
}
