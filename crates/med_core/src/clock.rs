//! Simulation clock and the schedulers that feed it ticks.
//!
//! The clock only decides *whether* ticks are delivered. Where ticks come from
//! is a [`Scheduler`]: tests use [`ManualScheduler`], headless runs use
//! [`WallScheduler`], and the daemon drives ticks from a tokio interval.

use std::time::{Duration, Instant};

/// Fixed period between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    Disposed,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    state: ClockState,
    delivered: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the clock transitioned to running. Starting a running
    /// or disposed clock does nothing.
    pub fn start(&mut self) -> bool {
        if self.state != ClockState::Stopped {
            return false;
        }
        self.state = ClockState::Running;
        tracing::debug!("simulation clock started");
        true
    }

    /// Idempotent. Returns `true` if the clock was running.
    pub fn stop(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Stopped;
        tracing::debug!(delivered = self.delivered, "simulation clock stopped");
        true
    }

    /// Permanently stops the clock. No tick is delivered afterwards.
    pub fn dispose(&mut self) {
        if self.state != ClockState::Disposed {
            tracing::debug!(delivered = self.delivered, "simulation clock disposed");
        }
        self.state = ClockState::Disposed;
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state == ClockState::Disposed
    }

    /// Total ticks delivered since creation.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Claims one tick. Returns `false` unless the clock is running.
    pub(crate) fn claim_tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.delivered += 1;
        true
    }
}

/// Source of due ticks.
pub trait Scheduler {
    /// Number of periods that elapsed since the previous call.
    fn due_ticks(&mut self) -> u64;
}

/// Scheduler advanced explicitly; lets tests drive ticks without waiting.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ticks: u64) {
        self.pending += ticks;
    }
}

impl Scheduler for ManualScheduler {
    fn due_ticks(&mut self) -> u64 {
        std::mem::take(&mut self.pending)
    }
}

/// Wall-clock scheduler: one tick per elapsed `period` since creation.
#[derive(Debug)]
pub struct WallScheduler {
    period: Duration,
    origin: Instant,
    reported: u64,
}

impl WallScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            origin: Instant::now(),
            reported: 0,
        }
    }

    /// Time left until the next period boundary.
    pub fn until_next(&self) -> Duration {
        let next = self.period * u32::try_from(self.reported + 1).unwrap_or(u32::MAX);
        next.saturating_sub(self.origin.elapsed())
    }
}

impl Scheduler for WallScheduler {
    fn due_ticks(&mut self) -> u64 {
        let period_nanos = self.period.as_nanos().max(1);
        let elapsed = u64::try_from(self.origin.elapsed().as_nanos() / period_nanos)
            .unwrap_or(u64::MAX);
        let due = elapsed.saturating_sub(self.reported);
        self.reported = elapsed;
        due
    }
}
