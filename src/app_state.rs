use crate::constants::REMINDER_INTERVAL_DEFAULT_MS;
use crate::overlay::{LifecycleState, PREVIEW_COUNTDOWN_TEXT};
use crate::utils::format_short_duration;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Status board shared between the event loop and command handles.
///
/// Only the event loop writes to it, after each processed timer or command.
/// Handles on other threads read it to answer status queries without
/// talking to the loop.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppStateInner>>,
}

pub struct AppStateInner {
    /// Current overlay lifecycle state
    pub lifecycle: LifecycleState,
    /// When the next reminder fires (None while showing or stopped)
    pub fires_at: Option<Instant>,
    /// Configured reminder interval in milliseconds
    pub interval_ms: u64,
    /// Last countdown line pushed to the overlay
    pub countdown_text: String,
    /// Number of reminders shown since start
    pub shows: u64,
    /// Whether the loop drives a preview overlay with no schedule
    pub preview: bool,
    /// Flag to signal that the event loop should exit
    pub should_exit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppStateInner {
                lifecycle: LifecycleState::Idle,
                fires_at: None,
                interval_ms: REMINDER_INTERVAL_DEFAULT_MS,
                countdown_text: String::new(),
                shows: 0,
                preview: false,
                should_exit: false,
            })),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, AppStateInner> {
        self.inner.lock()
    }

    pub fn get_lifecycle(&self) -> LifecycleState {
        self.inner.lock().lifecycle
    }

    pub fn set_fires_at(&self, fires_at: Option<Instant>) {
        self.inner.lock().fires_at = fires_at;
    }

    pub fn get_fires_at(&self) -> Option<Instant> {
        self.inner.lock().fires_at
    }

    pub fn set_interval_ms(&self, interval_ms: u64) {
        self.inner.lock().interval_ms = interval_ms;
    }

    pub fn get_interval_ms(&self) -> u64 {
        self.inner.lock().interval_ms
    }

    pub fn get_countdown_text(&self) -> String {
        self.inner.lock().countdown_text.clone()
    }

    pub fn get_shows(&self) -> u64 {
        self.inner.lock().shows
    }

    /// Time until the next reminder, zero when nothing is scheduled
    pub fn remaining(&self, now: Instant) -> Duration {
        self.inner
            .lock()
            .fires_at
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Compact countdown; falls back to the configured interval while the
    /// overlay is up and nothing is scheduled yet
    pub fn countdown_text(&self, now: Instant) -> String {
        let state = self.inner.lock();
        if state.preview {
            return PREVIEW_COUNTDOWN_TEXT.to_string();
        }
        match state.fires_at {
            Some(at) => {
                let ms = u64::try_from(at.saturating_duration_since(now).as_millis())
                    .unwrap_or(u64::MAX);
                format_short_duration(ms)
            }
            None => format_short_duration(state.interval_ms),
        }
    }

    /// Request that the event loop exit
    pub fn request_exit(&self) {
        self.inner.lock().should_exit = true;
    }

    pub fn should_exit(&self) -> bool {
        self.inner.lock().should_exit
    }

    /// Check if the loop should exit and clear the flag
    pub fn should_exit_and_clear(&self) -> bool {
        let mut state = self.inner.lock();
        let should_exit = state.should_exit;
        state.should_exit = false;
        should_exit
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_saturates_at_zero() {
        let state = AppState::new();
        let now = Instant::now();
        state.set_fires_at(Some(now + Duration::from_secs(5)));
        assert_eq!(state.remaining(now), Duration::from_secs(5));
        assert_eq!(state.remaining(now + Duration::from_secs(9)), Duration::ZERO);
    }

    #[test]
    fn test_countdown_without_schedule_uses_interval() {
        let state = AppState::new();
        state.set_interval_ms(90 * 60 * 1000);
        assert_eq!(state.countdown_text(Instant::now()), "1h 30m");
    }

    #[test]
    fn test_preview_countdown_ignores_interval() {
        let state = AppState::new();
        state.lock().preview = true;
        assert_eq!(state.countdown_text(Instant::now()), PREVIEW_COUNTDOWN_TEXT);
    }

    #[test]
    fn test_exit_flag_clears_once() {
        let state = AppState::new();
        assert!(!state.should_exit_and_clear());
        state.request_exit();
        assert!(state.should_exit());
        assert!(state.should_exit_and_clear());
        assert!(!state.should_exit_and_clear());
    }
}
