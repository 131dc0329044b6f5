//! Sprite sequencing and asset resolution
//!
//! The overlay's picture comes from exactly one `FrameSource`, resolved in
//! priority order: a PNG frame sequence, a looping movie file in the asset
//! directory, a bundled fallback movie, and finally a drawn placeholder.
//! Unreadable assets only ever push resolution down to the next tier.

use crate::constants::{MAX_SPRITE_FRAMES, PLACEHOLDER_SIZE_PX};
use crate::timer::Timer;
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Movie file names probed in the asset directory, in priority order
pub const MOVIE_CANDIDATES: [&str; 3] = ["animation.gif", "animation.webp", "animation.apng"];

/// One decoded still image
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: Arc<RgbaImage>,
    /// File the frame was decoded from, None for drawn frames
    pub source: Option<PathBuf>,
}

impl Frame {
    pub fn new(image: RgbaImage, source: Option<PathBuf>) -> Self {
        Self {
            image: Arc::new(image),
            source,
        }
    }
}

/// Looping movie played by an external player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieHandle {
    pub path: PathBuf,
}

/// Result of asset resolution
#[derive(Debug, Clone)]
pub enum FrameSource {
    Frames(Vec<Frame>),
    Movie(MovieHandle),
    Placeholder(Frame),
}

impl FrameSource {
    pub fn kind(&self) -> &'static str {
        match self {
            FrameSource::Frames(_) => "frames",
            FrameSource::Movie(_) => "movie",
            FrameSource::Placeholder(_) => "placeholder",
        }
    }
}

/// Asset-loading service: turns a directory into a frame source
pub trait AssetLoader {
    fn load(&self, dir: &Path) -> FrameSource;
}

/// Loads assets from the filesystem
#[derive(Debug, Clone, Default)]
pub struct DirectoryAssets {
    /// Movie shipped with the application, used when the directory has nothing
    pub fallback_movie: Option<PathBuf>,
}

impl DirectoryAssets {
    pub fn new(fallback_movie: Option<PathBuf>) -> Self {
        Self { fallback_movie }
    }
}

impl AssetLoader for DirectoryAssets {
    fn load(&self, dir: &Path) -> FrameSource {
        resolve_assets(dir, self.fallback_movie.as_deref())
    }
}

/// Resolve the frame source for `dir`, trying each tier in order
pub fn resolve_assets(dir: &Path, fallback_movie: Option<&Path>) -> FrameSource {
    let frames = load_frame_sequence(dir);
    if !frames.is_empty() {
        info!("Loaded {} sprite frames from {}", frames.len(), dir.display());
        return FrameSource::Frames(frames);
    }

    if let Some(movie) = find_movie(dir) {
        info!("Using movie {}", movie.path.display());
        return FrameSource::Movie(movie);
    }

    if let Some(path) = fallback_movie.filter(|p| is_playable(p)) {
        info!("Using bundled movie {}", path.display());
        return FrameSource::Movie(MovieHandle {
            path: path.to_path_buf(),
        });
    }

    info!("No reminder assets found in {}, drawing placeholder", dir.display());
    FrameSource::Placeholder(placeholder_frame(PLACEHOLDER_SIZE_PX))
}

/// Decode `frame1.png` .. `frame24.png`.
///
/// A missing `frame1.png` is skipped so numbering may start at 2; after that
/// the first gap ends the sequence. Files that fail to decode are skipped.
pub fn load_frame_sequence(dir: &Path) -> Vec<Frame> {
    let mut frames = Vec::new();
    if !dir.is_dir() {
        debug!("Asset directory {} does not exist", dir.display());
        return frames;
    }

    for index in 1..=MAX_SPRITE_FRAMES {
        let path = dir.join(format!("frame{}.png", index));
        if !path.exists() {
            if index == 1 {
                continue;
            }
            break;
        }
        match image::open(&path) {
            Ok(decoded) => frames.push(Frame::new(decoded.to_rgba8(), Some(path))),
            Err(e) => warn!("Skipping unreadable frame {}: {}", path.display(), e),
        }
    }
    frames
}

/// First playable movie candidate in `dir`
pub fn find_movie(dir: &Path) -> Option<MovieHandle> {
    MOVIE_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| is_playable(path))
        .map(|path| MovieHandle { path })
}

fn is_playable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => true,
        Ok(_) => {
            warn!("Ignoring empty movie file {}", path.display());
            false
        }
        Err(_) => false,
    }
}

/// Draw a water droplet: a circle with a cone rising to a tip, shaded with a
/// top-to-bottom blue gradient on a transparent background.
pub fn placeholder_frame(size: u32) -> Frame {
    let s = size.max(8) as f64;
    let cx = s / 2.0;
    let cy = s * 0.62;
    let radius = s * 0.3;
    let tip = s * 0.05;

    let top = [54.0, 178.0, 255.0];
    let bottom = [28.0, 120.0, 240.0];

    let image = RgbaImage::from_fn(size.max(8), size.max(8), |px, py| {
        let x = px as f64 + 0.5;
        let y = py as f64 + 0.5;
        let dx = x - cx;
        let dy = y - cy;

        let in_circle = dx * dx + dy * dy <= radius * radius;
        let in_cone = y >= tip && y <= cy && dx.abs() <= radius * (y - tip) / (cy - tip);
        if !(in_circle || in_cone) {
            return Rgba([0, 0, 0, 0]);
        }

        let t = (y / s).clamp(0.0, 1.0);
        let channel = |i: usize| (top[i] + (bottom[i] - top[i]) * t) as u8;
        Rgba([channel(0), channel(1), channel(2), 255])
    });

    Frame::new(image, None)
}

/// An empty frame list would leave nothing to show
fn non_empty(source: FrameSource) -> FrameSource {
    match source {
        FrameSource::Frames(frames) if frames.is_empty() => {
            warn!("Empty frame sequence, drawing placeholder");
            FrameSource::Placeholder(placeholder_frame(PLACEHOLDER_SIZE_PX))
        }
        other => other,
    }
}

/// What the overlay should currently display
#[derive(Debug, Clone, Copy)]
pub enum SpriteView<'a> {
    Frame(&'a Frame),
    Movie { handle: &'a MovieHandle, playing: bool },
}

/// Cycles a frame sequence on a fixed tick, or starts/stops a movie.
///
/// The tick only advances the frame index; enabling or disabling animation
/// arms or cancels the tick and leaves the displayed frame alone.
pub struct SpriteSequencer {
    source: FrameSource,
    index: usize,
    enabled: bool,
    running: bool,
    period: Duration,
    tick: Timer,
}

impl SpriteSequencer {
    pub fn new(source: FrameSource, period: Duration, enabled: bool) -> Self {
        Self {
            source: non_empty(source),
            index: 0,
            enabled,
            running: false,
            period,
            tick: Timer::new(),
        }
    }

    pub fn source(&self) -> &FrameSource {
        &self.source
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Swap in a freshly resolved source, releasing the old one
    pub fn replace_source(&mut self, source: FrameSource, now: Instant) {
        debug!("Sprite source replaced with {}", source.kind());
        self.source = non_empty(source);
        self.index = 0;
        self.rearm(now);
    }

    pub fn current(&self) -> SpriteView<'_> {
        match &self.source {
            FrameSource::Frames(frames) => SpriteView::Frame(&frames[self.index % frames.len()]),
            FrameSource::Movie(handle) => SpriteView::Movie {
                handle,
                playing: self.running && self.enabled,
            },
            FrameSource::Placeholder(frame) => SpriteView::Frame(frame),
        }
    }

    /// Restart from the first frame and begin ticking
    pub fn start(&mut self, now: Instant) {
        self.index = 0;
        self.running = true;
        self.rearm(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.tick.cancel();
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.rearm(now);
        }
    }

    /// Change the tick period; takes effect from the next tick
    pub fn set_period(&mut self, period: Duration) {
        if self.period != period {
            self.period = period;
            self.tick.set_period(period);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tick.deadline()
    }

    /// Handle a due tick. Returns true when the displayed frame changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        if !self.tick.fire(now) {
            return false;
        }
        match &self.source {
            FrameSource::Frames(frames) if frames.len() > 1 => {
                self.index = (self.index + 1) % frames.len();
                true
            }
            _ => false,
        }
    }

    /// Only frame sequences need a tick; movies run on their own player and
    /// the placeholder never changes.
    fn rearm(&mut self, now: Instant) {
        let ticks = self.running && self.enabled && matches!(self.source, FrameSource::Frames(_));
        if ticks {
            if !self.tick.is_armed() {
                self.tick.arm_repeating(now, self.period);
            }
        } else {
            self.tick.cancel();
        }
    }
}
