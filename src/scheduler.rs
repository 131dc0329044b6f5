//! Reminder scheduler
//!
//! Computes the next fire instant as `now + interval + jitter`, where jitter
//! is drawn uniformly from `[0, jitter_ceiling]`. The scheduler fires at most
//! once per arm and never re-arms itself: whoever consumes the fire decides
//! when the next cycle starts, which is also the point where a changed
//! configuration becomes visible.

use crate::config_file::ReminderConfig;
use crate::constants::REMINDER_INTERVAL_MIN_MS;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Snapshot of the pending schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleState {
    pub armed_at: Option<Instant>,
    pub fires_at: Option<Instant>,
}

impl ScheduleState {
    pub fn is_armed(&self) -> bool {
        self.fires_at.is_some()
    }
}

pub struct ReminderScheduler<R: Rng = StdRng> {
    rng: R,
    state: ScheduleState,
}

impl ReminderScheduler<StdRng> {
    /// Scheduler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> ReminderScheduler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            state: ScheduleState::default(),
        }
    }

    /// Arm (or re-arm) the schedule and return the fire instant.
    ///
    /// `interval` is clamped to at least one second. Any pending fire is
    /// replaced.
    pub fn arm(&mut self, now: Instant, interval: Duration, jitter_ceiling: Duration) -> Instant {
        let interval = interval.max(Duration::from_millis(REMINDER_INTERVAL_MIN_MS));
        let jitter = if jitter_ceiling.is_zero() {
            Duration::ZERO
        } else {
            let ceiling_ms = u64::try_from(jitter_ceiling.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(self.rng.gen_range(0..=ceiling_ms))
        };

        let fires_at = now + interval + jitter;
        self.state = ScheduleState {
            armed_at: Some(now),
            fires_at: Some(fires_at),
        };
        debug!(
            "Reminder armed: interval {:?} + jitter {:?}",
            interval, jitter
        );
        fires_at
    }

    /// Cancel whatever is pending and arm again from `now` using `config`
    pub fn reset(&mut self, now: Instant, config: &ReminderConfig) -> Instant {
        self.cancel();
        let fires_at = self.arm(now, config.interval(), config.jitter_ceiling());
        info!(
            "Next reminder in {}",
            crate::utils::format_short_duration(fires_at.duration_since(now).as_millis() as u64)
        );
        fires_at
    }

    pub fn cancel(&mut self) {
        self.state = ScheduleState::default();
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state.is_armed()
    }

    pub fn fires_at(&self) -> Option<Instant> {
        self.state.fires_at
    }

    /// Time left until the pending fire, zero when due or unarmed
    pub fn remaining(&self, now: Instant) -> Duration {
        self.state
            .fires_at
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Consume the fire if it is due. Returns true exactly once per arm.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.state.fires_at {
            Some(at) if at <= now => {
                self.state = ScheduleState::default();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> ReminderScheduler<StdRng> {
        ReminderScheduler::with_rng(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let mut scheduler = seeded(1);
        let now = Instant::now();
        for minutes in [1u64, 5, 45, 120] {
            let interval = Duration::from_secs(minutes * 60);
            assert_eq!(scheduler.arm(now, interval, Duration::ZERO), now + interval);
        }
    }

    #[test]
    fn test_jitter_stays_within_ceiling() {
        let now = Instant::now();
        let interval = Duration::from_secs(60);
        let ceiling = Duration::from_secs(30);

        for seed in 0..200 {
            let mut scheduler = seeded(seed);
            let fires_at = scheduler.arm(now, interval, ceiling);
            assert!(fires_at >= now + interval);
            assert!(fires_at <= now + interval + ceiling);
        }
    }

    #[test]
    fn test_interval_clamped_to_one_second() {
        let mut scheduler = seeded(7);
        let now = Instant::now();
        let fires_at = scheduler.arm(now, Duration::from_millis(5), Duration::ZERO);
        assert_eq!(fires_at, now + Duration::from_secs(1));
    }

    #[test]
    fn test_reset_discards_previous_schedule() {
        let mut scheduler = seeded(3);
        let config = ReminderConfig::default();
        let t0 = Instant::now();
        scheduler.arm(t0, Duration::from_secs(10), Duration::ZERO);

        let later = t0 + Duration::from_secs(7);
        let fires_at = scheduler.reset(later, &config);

        assert_eq!(fires_at, later + config.interval());
        assert_eq!(scheduler.state().armed_at, Some(later));
        assert!(!scheduler.take_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_fire_is_consumed_once() {
        let mut scheduler = seeded(4);
        let t0 = Instant::now();
        scheduler.arm(t0, Duration::from_secs(2), Duration::ZERO);

        assert!(!scheduler.take_due(t0 + Duration::from_secs(1)));
        assert!(scheduler.take_due(t0 + Duration::from_secs(2)));
        assert!(!scheduler.is_armed());
        assert!(!scheduler.take_due(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_remaining_counts_down_to_zero() {
        let mut scheduler = seeded(5);
        let t0 = Instant::now();
        scheduler.arm(t0, Duration::from_secs(60), Duration::ZERO);

        assert_eq!(scheduler.remaining(t0), Duration::from_secs(60));
        assert_eq!(
            scheduler.remaining(t0 + Duration::from_secs(45)),
            Duration::from_secs(15)
        );
        assert_eq!(scheduler.remaining(t0 + Duration::from_secs(90)), Duration::ZERO);

        scheduler.cancel();
        assert_eq!(scheduler.remaining(t0), Duration::ZERO);
    }
}
