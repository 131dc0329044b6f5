//! Transition animator for the overlay's entry and exit effects.
//!
//! A run interpolates either the window opacity or the window rectangle over
//! a fixed duration. The animator owns at most one run; starting another one
//! drops the previous run together with its completion token, so a token is
//! handed back at most once and only when its own run finishes naturally.

use crate::constants::*;
use crate::geometry::Rect;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Entry/exit effect selected in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Fade,
    Slide,
    Pop,
    None,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Fade,
        EffectKind::Slide,
        EffectKind::Pop,
        EffectKind::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Fade => "fade",
            EffectKind::Slide => "slide",
            EffectKind::Pop => "pop",
            EffectKind::None => "none",
        }
    }

    /// Run that brings the overlay from hidden to `target`
    pub fn entry(self, target: Rect, opacity: f64) -> TransitionSpec {
        match self {
            EffectKind::Fade => TransitionSpec {
                from: AnimatedValue::Opacity(0.0),
                to: AnimatedValue::Opacity(opacity),
                duration: Duration::from_millis(FADE_ENTRY_MS),
                easing: Easing::OutCubic,
            },
            EffectKind::Slide => TransitionSpec {
                from: AnimatedValue::Geometry(target.offset_y(SLIDE_ENTRY_OFFSET_PX)),
                to: AnimatedValue::Geometry(target),
                duration: Duration::from_millis(SLIDE_ENTRY_MS),
                easing: Easing::OutCubic,
            },
            EffectKind::Pop => TransitionSpec {
                from: AnimatedValue::Geometry(scaled(target, POP_ENTRY_MIN_EDGE_PX)),
                to: AnimatedValue::Geometry(target),
                duration: Duration::from_millis(POP_ENTRY_MS),
                easing: Easing::OutCubic,
            },
            EffectKind::None => TransitionSpec::snap(AnimatedValue::Opacity(opacity)),
        }
    }

    /// Run that takes the overlay from its current rectangle and opacity
    /// to hidden
    pub fn exit(self, current: Rect, opacity: f64) -> TransitionSpec {
        match self {
            EffectKind::Fade => TransitionSpec {
                from: AnimatedValue::Opacity(opacity),
                to: AnimatedValue::Opacity(0.0),
                duration: Duration::from_millis(FADE_EXIT_MS),
                easing: Easing::InQuad,
            },
            EffectKind::Slide => TransitionSpec {
                from: AnimatedValue::Geometry(current),
                to: AnimatedValue::Geometry(current.offset_y(SLIDE_EXIT_OFFSET_PX)),
                duration: Duration::from_millis(SLIDE_EXIT_MS),
                easing: Easing::InCubic,
            },
            EffectKind::Pop => TransitionSpec {
                from: AnimatedValue::Geometry(current),
                to: AnimatedValue::Geometry(scaled(current, POP_EXIT_MIN_EDGE_PX)),
                duration: Duration::from_millis(POP_EXIT_MS),
                easing: Easing::InBack,
            },
            EffectKind::None => TransitionSpec::snap(AnimatedValue::Opacity(0.0)),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown entry animation '{}'", s))
    }
}

/// `rect` shrunk to POP_SCALE around its center, never below `min_edge`
fn scaled(rect: Rect, min_edge: i32) -> Rect {
    let w = ((rect.width as f64 * POP_SCALE) as i32).max(min_edge) as u32;
    let h = ((rect.height as f64 * POP_SCALE) as i32).max(min_edge) as u32;
    rect.resized_around_center(w, h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    InQuad,
    InCubic,
    OutCubic,
    InBack,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::InQuad => t * t,
            Easing::InCubic => t * t * t,
            Easing::OutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::InBack => {
                // Standard overshoot constant
                const S: f64 = 1.70158;
                t * t * ((S + 1.0) * t - S)
            }
        }
    }
}

/// Value driven by a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedValue {
    Opacity(f64),
    Geometry(Rect),
}

impl AnimatedValue {
    fn interpolate(&self, to: &AnimatedValue, t: f64) -> AnimatedValue {
        match (self, to) {
            (AnimatedValue::Opacity(a), AnimatedValue::Opacity(b)) => {
                AnimatedValue::Opacity((a + (b - a) * t).clamp(0.0, 1.0))
            }
            (AnimatedValue::Geometry(a), AnimatedValue::Geometry(b)) => {
                AnimatedValue::Geometry(a.lerp(b, t))
            }
            // Mismatched endpoints cannot be blended, jump at the end
            _ => {
                if t >= 1.0 {
                    *to
                } else {
                    *self
                }
            }
        }
    }
}

/// Everything needed to start a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub from: AnimatedValue,
    pub to: AnimatedValue,
    pub duration: Duration,
    pub easing: Easing,
}

impl TransitionSpec {
    /// Zero-length run that lands on `value` immediately
    pub fn snap(value: AnimatedValue) -> Self {
        Self {
            from: value,
            to: value,
            duration: Duration::ZERO,
            easing: Easing::Linear,
        }
    }
}

/// One interpolation result. `completed` carries the run's token on the
/// step where the run finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub value: AnimatedValue,
    pub completed: Option<T>,
}

struct AnimationRun<T> {
    spec: TransitionSpec,
    started_at: Instant,
    last_step: Instant,
    token: T,
}

pub struct TransitionAnimator<T> {
    active: Option<AnimationRun<T>>,
    frame: Duration,
}

impl<T> Default for TransitionAnimator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransitionAnimator<T> {
    pub fn new() -> Self {
        Self {
            active: None,
            frame: Duration::from_millis(TRANSITION_FRAME_MS),
        }
    }

    /// Start a run, discarding any active run without completing it.
    ///
    /// Returns the value to apply right away. A zero-length run completes in
    /// this call and hands `token` straight back.
    pub fn start(&mut self, now: Instant, spec: TransitionSpec, token: T) -> Step<T> {
        if self.active.take().is_some() {
            debug!("Transition replaced before completion");
        }

        if spec.duration.is_zero() {
            return Step {
                value: spec.to,
                completed: Some(token),
            };
        }

        self.active = Some(AnimationRun {
            spec,
            started_at: now,
            last_step: now,
            token,
        });
        Step {
            value: spec.from,
            completed: None,
        }
    }

    /// Drop the active run; its token is never returned
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// When the next step is due: one frame after the last step, but never
    /// later than the run's end so completion lands on time.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|run| {
            let end = run.started_at + run.spec.duration;
            (run.last_step + self.frame).min(end)
        })
    }

    /// Interpolate the active run at `now`
    pub fn tick(&mut self, now: Instant) -> Option<Step<T>> {
        let run = self.active.as_mut()?;
        run.last_step = now;

        let elapsed = now.saturating_duration_since(run.started_at);
        let t = (elapsed.as_secs_f64() / run.spec.duration.as_secs_f64()).clamp(0.0, 1.0);

        if t >= 1.0 {
            let run = self.active.take()?;
            return Some(Step {
                value: run.spec.to,
                completed: Some(run.token),
            });
        }

        let eased = run.spec.easing.apply(t);
        Some(Step {
            value: run.spec.from.interpolate(&run.spec.to, eased),
            completed: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::InQuad,
            Easing::InCubic,
            Easing::OutCubic,
            Easing::InBack,
        ] {
            assert!(easing.apply(0.0).abs() < EPS, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_in_back_dips_below_zero() {
        assert!(Easing::InBack.apply(0.2) < 0.0);
    }

    #[test]
    fn test_fade_runs_to_completion() {
        let t0 = Instant::now();
        let mut animator = TransitionAnimator::new();
        let spec = EffectKind::Fade.entry(Rect::new(0, 0, 360, 180), 0.8);

        let first = animator.start(t0, spec, "entry");
        assert_eq!(first.value, AnimatedValue::Opacity(0.0));
        assert!(first.completed.is_none());

        let mid = animator.tick(t0 + Duration::from_millis(140)).expect("running");
        match mid.value {
            AnimatedValue::Opacity(o) => assert!(o > 0.4 && o < 0.8),
            other => panic!("unexpected value {:?}", other),
        }
        assert!(mid.completed.is_none());

        let done = animator.tick(t0 + Duration::from_millis(280)).expect("running");
        assert_eq!(done.value, AnimatedValue::Opacity(0.8));
        assert_eq!(done.completed, Some("entry"));
        assert!(!animator.is_running());
        assert!(animator.tick(t0 + Duration::from_millis(300)).is_none());
    }

    #[test]
    fn test_replaced_run_never_completes() {
        let t0 = Instant::now();
        let mut animator = TransitionAnimator::new();
        let rect = Rect::new(0, 0, 360, 180);

        animator.start(t0, EffectKind::Slide.entry(rect, 1.0), "entry");
        animator.start(
            t0 + Duration::from_millis(100),
            EffectKind::Slide.exit(rect, 1.0),
            "exit",
        );

        let mut completions = Vec::new();
        let mut now = t0 + Duration::from_millis(100);
        while let Some(deadline) = animator.next_deadline() {
            now = deadline.max(now);
            if let Some(step) = animator.tick(now) {
                completions.extend(step.completed);
            }
        }
        assert_eq!(completions, vec!["exit"]);
    }

    #[test]
    fn test_none_and_zero_duration_complete_immediately() {
        let t0 = Instant::now();
        let mut animator = TransitionAnimator::new();
        let rect = Rect::new(0, 0, 360, 180);

        let step = animator.start(t0, EffectKind::None.entry(rect, 0.9), 1u8);
        assert_eq!(step.value, AnimatedValue::Opacity(0.9));
        assert_eq!(step.completed, Some(1));
        assert!(!animator.is_running());

        let zero = TransitionSpec {
            from: AnimatedValue::Opacity(1.0),
            to: AnimatedValue::Opacity(0.0),
            duration: Duration::ZERO,
            easing: Easing::InQuad,
        };
        let step = animator.start(t0, zero, 2u8);
        assert_eq!(step.completed, Some(2));
    }

    #[test]
    fn test_deadline_lands_on_run_end() {
        let t0 = Instant::now();
        let mut animator = TransitionAnimator::new();
        animator.start(t0, EffectKind::Fade.exit(Rect::new(0, 0, 10, 10), 1.0), ());

        let mut now = t0;
        let mut steps = 0;
        while let Some(deadline) = animator.next_deadline() {
            now = deadline;
            animator.tick(now);
            steps += 1;
        }
        assert_eq!(now, t0 + Duration::from_millis(FADE_EXIT_MS));
        assert!(steps >= (FADE_EXIT_MS / TRANSITION_FRAME_MS) as usize);
    }

    #[test]
    fn test_slide_geometry() {
        let target = Rect::new(1544, 884, 360, 180);
        let entry = EffectKind::Slide.entry(target, 1.0);
        assert_eq!(entry.from, AnimatedValue::Geometry(Rect::new(1544, 944, 360, 180)));
        assert_eq!(entry.to, AnimatedValue::Geometry(target));

        let exit = EffectKind::Slide.exit(target, 1.0);
        assert_eq!(exit.to, AnimatedValue::Geometry(Rect::new(1544, 964, 360, 180)));
        assert_eq!(exit.duration, Duration::from_millis(240));
    }

    #[test]
    fn test_pop_geometry() {
        let target = Rect::new(100, 100, 200, 100);
        let entry = EffectKind::Pop.entry(target, 1.0);
        assert_eq!(entry.from, AnimatedValue::Geometry(Rect::new(110, 105, 180, 90)));
        assert_eq!(entry.easing, Easing::OutCubic);

        let exit = EffectKind::Pop.exit(target, 1.0);
        assert_eq!(exit.to, AnimatedValue::Geometry(Rect::new(110, 105, 180, 90)));
        assert_eq!(exit.easing, Easing::InBack);

        let tiny = Rect::new(0, 0, 30, 30);
        match EffectKind::Pop.entry(tiny, 1.0).from {
            AnimatedValue::Geometry(r) => assert_eq!((r.width, r.height), (40, 40)),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_effect_kind_parsing() {
        assert_eq!("slide".parse::<EffectKind>().unwrap(), EffectKind::Slide);
        assert_eq!("NONE".parse::<EffectKind>().unwrap(), EffectKind::None);
        assert!("spin".parse::<EffectKind>().is_err());
    }
}
