//! Overlay lifecycle controller
//!
//! Owns the `Idle -> Entering -> Visible -> Hiding -> Idle` state machine and
//! every timer that drives it: the reminder schedule, auto-hide, entry/exit
//! transitions, the sprite tick, the launch preview and the countdown
//! refresh. Nothing here sleeps; the event loop asks for `next_deadline()`
//! and calls `tick()` once it has passed.

use crate::animation::{AnimatedValue, Step, TransitionAnimator};
use crate::config_file::ReminderConfig;
use crate::constants::COUNTDOWN_REFRESH_MS;
use crate::geometry::Rect;
use crate::monitor::{self, MonitorProvider};
use crate::scheduler::ReminderScheduler;
use crate::sprite::{AssetLoader, SpriteSequencer, SpriteView};
use crate::surface::OverlaySurface;
use crate::timer::Timer;
use crate::utils::{format_short_duration, render_countdown};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Countdown line shown by a preview overlay in place of the template
pub const PREVIEW_COUNTDOWN_TEXT: &str = "Next reminder in preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Idle,
    Entering,
    Visible,
    Hiding,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Entering => "entering",
            LifecycleState::Visible => "visible",
            LifecycleState::Hiding => "hiding",
        }
    }

    /// Whether the overlay is on screen and not on its way out
    pub fn is_showing(self) -> bool {
        matches!(self, LifecycleState::Entering | LifecycleState::Visible)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion token carried by a transition run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Preview,
}

pub struct OverlayController<S, R: Rng = StdRng> {
    config: ReminderConfig,
    mode: Mode,
    state: LifecycleState,
    surface: S,
    monitors: Box<dyn MonitorProvider>,
    assets: Box<dyn AssetLoader>,
    /// None in preview mode
    scheduler: Option<ReminderScheduler<R>>,
    animator: TransitionAnimator<Phase>,
    sprite: SpriteSequencer,
    auto_hide: Timer,
    countdown: Timer,
    launch_preview: Timer,
    placement: Rect,
    /// Geometry and opacity last pushed to the surface
    shown_geometry: Rect,
    shown_opacity: f64,
    shows: u64,
    stopped: bool,
}

impl<S: OverlaySurface, R: Rng> OverlayController<S, R> {
    /// Live controller. Nothing is armed until `start()`.
    pub fn new(
        config: ReminderConfig,
        surface: S,
        monitors: Box<dyn MonitorProvider>,
        assets: Box<dyn AssetLoader>,
        scheduler: ReminderScheduler<R>,
    ) -> Self {
        Self::build(config, Mode::Live, surface, monitors, assets, Some(scheduler))
    }

    fn build(
        config: ReminderConfig,
        mode: Mode,
        surface: S,
        monitors: Box<dyn MonitorProvider>,
        assets: Box<dyn AssetLoader>,
        scheduler: Option<ReminderScheduler<R>>,
    ) -> Self {
        let config = config.sanitized();
        let source = assets.load(&config.asset_directory);
        let sprite = SpriteSequencer::new(source, config.animation_period(), config.animation_enabled);
        let placement = monitor::place(
            monitors.as_ref(),
            &config.monitor_id,
            config.extent(),
            config.position,
            config.margin_x,
            config.margin_y,
        );
        let shown_opacity = config.overlay_opacity;

        Self {
            config,
            mode,
            state: LifecycleState::Idle,
            surface,
            monitors,
            assets,
            scheduler,
            animator: TransitionAnimator::new(),
            sprite,
            auto_hide: Timer::new(),
            countdown: Timer::new(),
            launch_preview: Timer::new(),
            placement,
            shown_geometry: placement,
            shown_opacity,
            shows: 0,
            stopped: false,
        }
    }

    /// Arm the schedule, the countdown refresh and the optional launch preview
    pub fn start(&mut self, now: Instant) {
        if self.mode == Mode::Preview {
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.reset(now, &self.config);
        }
        self.countdown
            .arm_repeating(now, Duration::from_millis(COUNTDOWN_REFRESH_MS));
        if self.config.show_preview_on_launch {
            self.launch_preview.arm_once(now, self.config.preview_delay());
            debug!(
                "Launch preview in {}",
                format_short_duration(self.config.preview_delay_ms)
            );
        }
        self.refresh_countdown(now);
    }

    /// Cancel every timer and take the overlay down for good
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.animator.cancel();
        self.sprite.stop();
        self.auto_hide.cancel();
        self.countdown.cancel();
        self.launch_preview.cancel();
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel();
        }
        if self.state != LifecycleState::Idle {
            self.surface.hide();
            self.set_state(LifecycleState::Idle);
        }
        info!("Reminder overlay stopped after {} reminders", self.shows);
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sprite(&self) -> &SpriteSequencer {
        &self.sprite
    }

    /// Where the overlay rests once its entry transition is done
    pub fn placement(&self) -> Rect {
        self.placement
    }

    pub fn is_preview(&self) -> bool {
        self.mode == Mode::Preview
    }

    /// Number of times the overlay has entered
    pub fn shows(&self) -> u64 {
        self.shows
    }

    pub fn fires_at(&self) -> Option<Instant> {
        self.scheduler.as_ref().and_then(|s| s.fires_at())
    }

    /// Time until the next scheduled reminder, zero when nothing is armed
    pub fn remaining(&self, now: Instant) -> Duration {
        self.scheduler
            .as_ref()
            .map(|s| s.remaining(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Compact time-to-next-reminder text. While the overlay is up the
    /// schedule has already fired, so the configured interval is shown.
    pub fn countdown_text(&self, now: Instant) -> String {
        match self.scheduler.as_ref() {
            None => PREVIEW_COUNTDOWN_TEXT.to_string(),
            Some(s) if s.is_armed() => format_short_duration(duration_ms(s.remaining(now))),
            Some(_) => format_short_duration(self.config.reminder_interval_ms),
        }
    }

    /// Show the reminder immediately.
    ///
    /// An overlay already on screen is repositioned and its auto-hide
    /// restarted; one on its way out is brought back.
    pub fn show_now(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        if self.mode == Mode::Preview {
            self.inspect_effect(now);
            return;
        }

        match self.state {
            LifecycleState::Idle => self.enter(now),
            LifecycleState::Entering | LifecycleState::Visible => {
                info!("Reminder already showing, restarting auto-hide");
                self.reposition();
                self.surface.raise_topmost();
                self.auto_hide.arm_once(now, self.config.auto_hide());
            }
            LifecycleState::Hiding => {
                self.animator.cancel();
                self.enter(now);
            }
        }
    }

    /// User dismissal. Ignored unless the overlay is entering or visible.
    pub fn dismiss(&mut self, now: Instant) {
        if self.mode == Mode::Preview || !self.state.is_showing() {
            debug!("Dismiss ignored while {}", self.state);
            return;
        }

        info!("Reminder dismissed");
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.reset(now, &self.config);
        }
        self.begin_exit(now);
    }

    /// Commit a new configuration snapshot.
    ///
    /// Visual parameters apply at once to an overlay that is showing. A
    /// pending schedule is only replaced when interval or jitter changed;
    /// the running auto-hide is left alone.
    pub fn apply_config(&mut self, now: Instant, config: ReminderConfig) {
        let config = config.sanitized();
        let previous = std::mem::replace(&mut self.config, config);

        if previous.asset_directory != self.config.asset_directory {
            let source = self.assets.load(&self.config.asset_directory);
            self.sprite.replace_source(source, now);
        }
        self.sprite.set_period(self.config.animation_period());
        self.sprite.set_enabled(self.config.animation_enabled, now);

        if self.state.is_showing() {
            let message = self.config.message();
            self.surface.apply_content(&self.config, &message);
            self.reposition();
            if self.state == LifecycleState::Visible {
                self.put_opacity(self.config.overlay_opacity);
            }
            self.present_sprite();
        }

        let stale = self.config.timing_differs(&previous);
        if let Some(scheduler) = self.scheduler.as_mut() {
            if stale && scheduler.is_armed() {
                scheduler.reset(now, &self.config);
            }
        }

        self.refresh_countdown(now);
        info!("Configuration applied");
    }

    /// Preview only: replay the entry transition so the effect can be seen
    pub fn inspect_effect(&mut self, now: Instant) {
        if self.mode != Mode::Preview {
            return;
        }
        self.placement = self.current_placement();
        let spec = self
            .config
            .entry_animation
            .entry(self.placement, self.config.overlay_opacity);
        self.prime_surface(&spec.from);
        let step = self.animator.start(now, spec, Phase::Entry);
        self.handle_step(now, step);
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.animator.next_deadline(),
            self.auto_hide.deadline(),
            self.fires_at(),
            self.sprite.next_deadline(),
            self.launch_preview.deadline(),
            self.countdown.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Run at most one due timer. Returns whether anything fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.animator.next_deadline().is_some_and(|d| d <= now) {
            if let Some(step) = self.animator.tick(now) {
                self.handle_step(now, step);
            }
            return true;
        }

        if self.auto_hide.fire(now) {
            info!("Auto-hide elapsed");
            self.begin_exit(now);
            return true;
        }

        if self.scheduler.as_mut().is_some_and(|s| s.take_due(now)) {
            self.on_schedule_fire(now);
            return true;
        }

        if self.sprite.next_deadline().is_some_and(|d| d <= now) {
            if self.sprite.advance(now) {
                self.present_sprite();
            }
            return true;
        }

        if self.launch_preview.fire(now) {
            info!("Showing launch preview");
            self.show_now(now);
            return true;
        }

        if self.countdown.fire(now) {
            self.refresh_countdown(now);
            return true;
        }

        false
    }

    fn on_schedule_fire(&mut self, now: Instant) {
        if self.state != LifecycleState::Idle {
            debug!("Reminder due while {}, skipping this cycle", self.state);
            return;
        }
        info!("Reminder due");
        self.enter(now);
    }

    fn enter(&mut self, now: Instant) {
        self.shows += 1;
        self.placement = self.current_placement();

        let message = self.config.message();
        self.surface.apply_content(&self.config, &message);
        self.refresh_countdown(now);

        let spec = self
            .config
            .entry_animation
            .entry(self.placement, self.config.overlay_opacity);
        self.prime_surface(&spec.from);

        self.set_state(LifecycleState::Entering);
        self.surface.show();
        self.surface.raise_topmost();

        self.sprite.start(now);
        self.present_sprite();
        self.auto_hide.arm_once(now, self.config.auto_hide());

        let step = self.animator.start(now, spec, Phase::Entry);
        self.handle_step(now, step);
    }

    fn begin_exit(&mut self, now: Instant) {
        self.set_state(LifecycleState::Hiding);
        self.auto_hide.cancel();
        self.sprite.stop();
        self.present_sprite();
        self.animator.cancel();

        // Leave from wherever an interrupted entry left the overlay
        let spec = self
            .config
            .entry_animation
            .exit(self.shown_geometry, self.shown_opacity);
        let step = self.animator.start(now, spec, Phase::Exit);
        self.handle_step(now, step);
    }

    fn handle_step(&mut self, now: Instant, step: Step<Phase>) {
        self.apply_value(step.value);
        match step.completed {
            Some(Phase::Entry) => self.finish_entry(),
            Some(Phase::Exit) => self.finish_exit(now),
            None => {}
        }
    }

    fn finish_entry(&mut self) {
        // Settle on the latest placement in case config changed mid-run
        self.put_geometry(self.placement);
        self.put_opacity(self.config.overlay_opacity);
        if self.state == LifecycleState::Entering {
            self.set_state(LifecycleState::Visible);
        }
    }

    fn finish_exit(&mut self, now: Instant) {
        self.surface.hide();
        self.put_geometry(self.placement);
        self.put_opacity(self.config.overlay_opacity);
        self.set_state(LifecycleState::Idle);

        if self.stopped {
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            if !scheduler.is_armed() {
                scheduler.reset(now, &self.config);
            }
        }
        self.refresh_countdown(now);
    }

    /// Put the surface at the start of a run: geometry effects need full
    /// opacity, opacity effects need the resting geometry.
    fn prime_surface(&mut self, from: &AnimatedValue) {
        match from {
            AnimatedValue::Opacity(_) => self.put_geometry(self.placement),
            AnimatedValue::Geometry(_) => self.put_opacity(self.config.overlay_opacity),
        }
        self.apply_value(*from);
    }

    fn apply_value(&mut self, value: AnimatedValue) {
        match value {
            AnimatedValue::Opacity(opacity) => self.put_opacity(opacity),
            AnimatedValue::Geometry(rect) => self.put_geometry(rect),
        }
    }

    fn put_geometry(&mut self, rect: Rect) {
        self.shown_geometry = rect;
        self.surface.set_geometry(rect);
    }

    fn put_opacity(&mut self, opacity: f64) {
        self.shown_opacity = opacity;
        self.surface.set_opacity(opacity);
    }

    fn reposition(&mut self) {
        self.placement = self.current_placement();
        // An entry run lands on the new placement when it completes
        if self.state != LifecycleState::Entering {
            self.put_geometry(self.placement);
        }
    }

    fn current_placement(&self) -> Rect {
        monitor::place(
            self.monitors.as_ref(),
            &self.config.monitor_id,
            self.config.extent(),
            self.config.position,
            self.config.margin_x,
            self.config.margin_y,
        )
    }

    fn present_sprite(&mut self) {
        match self.sprite.current() {
            SpriteView::Frame(frame) => self.surface.set_frame(frame),
            SpriteView::Movie {
                handle,
                playing: true,
            } => self.surface.play_movie(handle),
            SpriteView::Movie { playing: false, .. } => self.surface.stop_movie(),
        }
    }

    fn refresh_countdown(&mut self, now: Instant) {
        let text = if !self.config.countdown_enabled {
            String::new()
        } else if self.mode == Mode::Preview {
            PREVIEW_COUNTDOWN_TEXT.to_string()
        } else {
            render_countdown(&self.config.countdown_template, &self.countdown_text(now))
        };
        self.surface.set_countdown_text(&text);
    }

    fn set_state(&mut self, to: LifecycleState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!("Reminder overlay {} -> {}", from, to);
        self.surface.lifecycle_changed(from, to);
    }
}

impl<S: OverlaySurface> OverlayController<S, StdRng> {
    /// Preview controller: always visible, no schedule and no auto-hide
    pub fn preview(
        now: Instant,
        config: ReminderConfig,
        surface: S,
        monitors: Box<dyn MonitorProvider>,
        assets: Box<dyn AssetLoader>,
    ) -> Self {
        let mut controller = Self::build(config, Mode::Preview, surface, monitors, assets, None);

        let message = controller.config.message();
        controller.surface.apply_content(&controller.config, &message);
        controller.put_geometry(controller.placement);
        controller.put_opacity(controller.config.overlay_opacity);
        controller.set_state(LifecycleState::Visible);
        controller.surface.show();
        controller.sprite.start(now);
        controller.present_sprite();
        controller.refresh_countdown(now);
        controller
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
