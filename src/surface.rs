//! Rendering collaborator for the reminder overlay
//!
//! The lifecycle controller only decides what the overlay shows and where.
//! Painting, window management and the always-on-top primitive live behind
//! `OverlaySurface`.

use crate::config_file::ReminderConfig;
use crate::geometry::Rect;
use crate::overlay::LifecycleState;
use crate::sprite::{Frame, MovieHandle};
use log::{debug, info, warn};
use std::path::PathBuf;

pub trait OverlaySurface {
    fn show(&mut self);
    fn hide(&mut self);

    /// Put the overlay above every other window. Called once per show.
    fn raise_topmost(&mut self);

    fn set_geometry(&mut self, rect: Rect);
    fn set_opacity(&mut self, opacity: f64);

    /// Restyle from `config` and display the rendered reminder message
    fn apply_content(&mut self, config: &ReminderConfig, message: &str);

    fn set_frame(&mut self, frame: &Frame);
    fn play_movie(&mut self, movie: &MovieHandle);
    fn stop_movie(&mut self);

    /// Empty text hides the countdown line
    fn set_countdown_text(&mut self, text: &str);

    fn lifecycle_changed(&mut self, _from: LifecycleState, _to: LifecycleState) {}
}

/// Surface for desktops without an overlay window: every reminder is
/// delivered as a desktop notification and the rest is logged.
pub struct NotificationSurface {
    app_name: String,
    title: String,
    message: String,
    timeout_ms: u32,
}

impl NotificationSurface {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            title: String::new(),
            message: String::new(),
            timeout_ms: 0,
        }
    }
}

impl OverlaySurface for NotificationSurface {
    fn show(&mut self) {
        info!("{}: {}", self.title, self.message);

        let result = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(&self.title)
            .body(&self.message)
            .timeout(notify_rust::Timeout::Milliseconds(self.timeout_ms))
            .show();
        if let Err(e) = result {
            warn!("Failed to deliver desktop notification: {}", e);
        }
    }

    fn hide(&mut self) {
        debug!("Overlay hidden");
    }

    fn raise_topmost(&mut self) {
        debug!("Overlay raised to top");
    }

    fn set_geometry(&mut self, rect: Rect) {
        debug!(
            "Overlay geometry {}x{} at ({}, {})",
            rect.width, rect.height, rect.x, rect.y
        );
    }

    fn set_opacity(&mut self, opacity: f64) {
        debug!("Overlay opacity {:.2}", opacity);
    }

    fn apply_content(&mut self, config: &ReminderConfig, message: &str) {
        self.title = config.title_text.clone();
        self.message = message.to_string();
        self.timeout_ms = u32::try_from(config.auto_hide_ms).unwrap_or(u32::MAX);
    }

    fn set_frame(&mut self, frame: &Frame) {
        match &frame.source {
            Some(path) => debug!("Sprite frame {}", path.display()),
            None => debug!("Sprite frame (placeholder)"),
        }
    }

    fn play_movie(&mut self, movie: &MovieHandle) {
        debug!("Playing movie {}", movie.path.display());
    }

    fn stop_movie(&mut self) {
        debug!("Movie stopped");
    }

    fn set_countdown_text(&mut self, text: &str) {
        if !text.is_empty() {
            debug!("Countdown: {}", text);
        }
    }

    fn lifecycle_changed(&mut self, from: LifecycleState, to: LifecycleState) {
        debug!("Surface saw {} -> {}", from, to);
    }
}

/// One call made on a `RecordingSurface`
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Show,
    Hide,
    Raise,
    Geometry(Rect),
    Opacity(f64),
    Content(String),
    Frame(Option<PathBuf>),
    PlayMovie(PathBuf),
    StopMovie,
    Countdown(String),
    Lifecycle(LifecycleState, LifecycleState),
}

/// Headless surface that records every call, for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
    pub visible: bool,
    pub geometry: Option<Rect>,
    pub opacity: Option<f64>,
    pub countdown: String,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(LifecycleState, LifecycleState)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Lifecycle(from, to) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &SurfaceEvent) -> usize {
        self.events.iter().filter(|event| *event == wanted).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl OverlaySurface for RecordingSurface {
    fn show(&mut self) {
        self.visible = true;
        self.events.push(SurfaceEvent::Show);
    }

    fn hide(&mut self) {
        self.visible = false;
        self.events.push(SurfaceEvent::Hide);
    }

    fn raise_topmost(&mut self) {
        self.events.push(SurfaceEvent::Raise);
    }

    fn set_geometry(&mut self, rect: Rect) {
        self.geometry = Some(rect);
        self.events.push(SurfaceEvent::Geometry(rect));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = Some(opacity);
        self.events.push(SurfaceEvent::Opacity(opacity));
    }

    fn apply_content(&mut self, _config: &ReminderConfig, message: &str) {
        self.events.push(SurfaceEvent::Content(message.to_string()));
    }

    fn set_frame(&mut self, frame: &Frame) {
        self.events.push(SurfaceEvent::Frame(frame.source.clone()));
    }

    fn play_movie(&mut self, movie: &MovieHandle) {
        self.events.push(SurfaceEvent::PlayMovie(movie.path.clone()));
    }

    fn stop_movie(&mut self) {
        self.events.push(SurfaceEvent::StopMovie);
    }

    fn set_countdown_text(&mut self, text: &str) {
        self.countdown = text.to_string();
        self.events.push(SurfaceEvent::Countdown(text.to_string()));
    }

    fn lifecycle_changed(&mut self, from: LifecycleState, to: LifecycleState) {
        self.events.push(SurfaceEvent::Lifecycle(from, to));
    }
}
