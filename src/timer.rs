use std::time::{Duration, Instant};

/// Deadline-driven timer polled by the event loop.
///
/// Arming always replaces the pending deadline, so a timer never has more
/// than one fire outstanding, and a cancelled timer never fires.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    deadline: Option<Instant>,
    /// Some(period) for repeating timers
    period: Option<Duration>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` after `now`
    pub fn arm_once(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
        self.period = None;
    }

    /// Fire every `period`, first fire one period after `now`
    pub fn arm_repeating(&mut self, now: Instant, period: Duration) {
        self.deadline = Some(now + period);
        self.period = Some(period);
    }

    /// Change the period of a repeating timer without restarting it
    pub fn set_period(&mut self, period: Duration) {
        if self.period.is_some() {
            self.period = Some(period);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.period = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Consume a due fire. One-shot timers disarm, repeating timers move to
    /// the next period measured from `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        match self.period {
            Some(period) => self.deadline = Some(now + period),
            None => self.deadline = None,
        }
        true
    }
}
