// Library interface for the hydration reminder
// The binary and the integration tests drive the engine through this facade

pub mod animation;
pub mod app_state;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod geometry;
pub mod monitor;
pub mod overlay;
pub mod scheduler;
pub mod sprite;
pub mod surface;
pub mod timer;
pub mod utils;

use anyhow::{anyhow, Result};
use app_state::AppState;
use config_file::ReminderConfig;
use log::{debug, info};
use overlay::{LifecycleState, OverlayController};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use surface::OverlaySurface;

/// Commands accepted by the event loop
#[derive(Debug, Clone)]
pub enum Command {
    ShowNow,
    Dismiss,
    ApplyConfig(Box<ReminderConfig>),
    Quit,
}

/// Cloneable handle for talking to a running `ReminderCore` from any thread
#[derive(Clone)]
pub struct ReminderHandle {
    tx: Sender<Command>,
    state: AppState,
}

impl ReminderHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("Reminder loop has stopped"))
    }

    /// Show the reminder right away
    pub fn show_now(&self) -> Result<()> {
        self.send(Command::ShowNow)
    }

    /// Dismiss the reminder if it is showing
    pub fn dismiss(&self) -> Result<()> {
        self.send(Command::Dismiss)
    }

    /// Commit a new configuration snapshot
    pub fn apply_config(&self, config: ReminderConfig) -> Result<()> {
        self.send(Command::ApplyConfig(Box::new(config)))
    }

    /// Stop the event loop
    pub fn quit(&self) -> Result<()> {
        self.state.request_exit();
        self.send(Command::Quit)
    }

    /// Time until the next reminder, as last published by the loop
    pub fn remaining_time(&self, now: Instant) -> Duration {
        self.state.remaining(now)
    }

    pub fn countdown_text(&self, now: Instant) -> String {
        self.state.countdown_text(now)
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.get_lifecycle()
    }

    pub fn shows(&self) -> u64 {
        self.state.get_shows()
    }
}

/// Core reminder engine: the overlay controller plus its command queue
pub struct ReminderCore<S, R: Rng = StdRng> {
    pub state: AppState,
    controller: OverlayController<S, R>,
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl<S: OverlaySurface, R: Rng> ReminderCore<S, R> {
    pub fn new(controller: OverlayController<S, R>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: AppState::new(),
            controller,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> ReminderHandle {
        ReminderHandle {
            tx: self.tx.clone(),
            state: self.state.clone(),
        }
    }

    pub fn controller(&self) -> &OverlayController<S, R> {
        &self.controller
    }

    /// Arm the schedule and publish the initial status
    pub fn start(&mut self, now: Instant) {
        self.controller.start(now);
        self.publish(now);
    }

    /// Apply one command. Returns false when the loop should stop.
    pub fn process(&mut self, command: Command, now: Instant) -> bool {
        debug!("Processing command {:?}", command);
        let keep_running = match command {
            Command::ShowNow => {
                self.controller.show_now(now);
                true
            }
            Command::Dismiss => {
                self.controller.dismiss(now);
                true
            }
            Command::ApplyConfig(config) => {
                self.controller.apply_config(now, *config);
                true
            }
            Command::Quit => false,
        };
        self.publish(now);
        keep_running
    }

    /// One non-blocking loop iteration: fire a due timer, otherwise take one
    /// queued command. Returns false once a quit has been processed.
    pub fn pump(&mut self, now: Instant) -> bool {
        if self.controller.tick(now) {
            self.publish(now);
            return true;
        }
        match self.rx.try_recv() {
            Ok(command) => self.process(command, now),
            Err(_) => true,
        }
    }

    /// Run the event loop on the current thread until quit
    pub fn run(&mut self) {
        self.start(Instant::now());
        info!("Reminder loop running");

        loop {
            if self.state.should_exit_and_clear() {
                break;
            }

            let now = Instant::now();
            if self.controller.tick(now) {
                self.publish(now);
                continue;
            }

            let received = match self.controller.next_deadline() {
                Some(deadline) => self.rx.recv_timeout(deadline.saturating_duration_since(now)),
                None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let command = match received {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if !self.process(command, Instant::now()) {
                break;
            }
        }

        self.controller.shutdown();
        self.publish(Instant::now());
        info!("Reminder loop stopped");
    }

    fn publish(&self, now: Instant) {
        let mut state = self.state.lock();
        state.lifecycle = self.controller.state();
        state.fires_at = self.controller.fires_at();
        state.interval_ms = self.controller.config().reminder_interval_ms;
        state.countdown_text = self.controller.countdown_text(now);
        state.shows = self.controller.shows();
        state.preview = self.controller.is_preview();
    }
}
