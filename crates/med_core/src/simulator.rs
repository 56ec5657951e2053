//! Simulator component shared by every physiology model.
//!
//! The model supplies a pure step function and says which slot of the
//! [`AppStore`] it owns. The component owns everything that is not persisted:
//! clock, chart history, feedback log and the derived treatment phase.

use crate::chart::{ChartHistory, ChartPoint};
use crate::clock::{ClockState, Scheduler, SimulationClock};
use crate::feedback::{FeedbackEntry, FeedbackLog};
use crate::store::AppStore;
use std::marker::PhantomData;

/// Everything one tick produces.
#[derive(Debug, Clone)]
pub struct StepOutput<P, Ph> {
    /// Fields the tick changed. Merged into the store.
    pub patch: P,
    pub phase: Ph,
    pub point: ChartPoint,
    pub feedback: Vec<FeedbackEntry>,
}

pub trait PhysiologyModel {
    type State: Clone + PartialEq + std::fmt::Debug;
    type Patch: std::fmt::Debug;
    type Phase: Copy + Default + PartialEq + std::fmt::Debug;

    const NAME: &'static str;

    /// Pure update rule. Reads only `state` as it was before the tick.
    fn step(state: &Self::State, phase: Self::Phase) -> StepOutput<Self::Patch, Self::Phase>;

    fn state(store: &AppStore) -> &Self::State;
    fn update(store: &mut AppStore, patch: &Self::Patch);
    fn reset(store: &mut AppStore);
}

pub struct Simulator<M: PhysiologyModel> {
    clock: SimulationClock,
    chart: ChartHistory,
    feedback: FeedbackLog,
    phase: M::Phase,
    _model: PhantomData<M>,
}

impl<M: PhysiologyModel> std::fmt::Debug for Simulator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("model", &M::NAME)
            .field("clock", &self.clock.state())
            .field("chart_points", &self.chart.len())
            .field("feedback", &self.feedback.len())
            .field("phase", &self.phase)
            .finish()
    }
}

impl<M: PhysiologyModel> Default for Simulator<M> {
    fn default() -> Self {
        Self {
            clock: SimulationClock::new(),
            chart: ChartHistory::new(),
            feedback: FeedbackLog::new(),
            phase: M::Phase::default(),
            _model: PhantomData,
        }
    }
}

impl<M: PhysiologyModel> Simulator<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> bool {
        self.clock.start()
    }

    pub fn stop(&mut self) -> bool {
        self.clock.stop()
    }

    /// Start/pause button. Returns whether the clock is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.clock.is_running() {
            self.clock.stop();
        } else {
            self.clock.start();
        }
        self.clock.is_running()
    }

    /// Stops the clock for good. Call before dropping the owning view.
    pub fn dispose(&mut self) {
        self.clock.dispose();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn chart(&self) -> &ChartHistory {
        &self.chart
    }

    pub fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    pub fn phase(&self) -> M::Phase {
        self.phase
    }

    pub fn state<'s>(&self, store: &'s AppStore) -> &'s M::State {
        M::state(store)
    }

    /// Applies the update rule once if the clock is running.
    pub fn tick(&mut self, store: &mut AppStore) -> bool {
        if !self.clock.claim_tick() {
            return false;
        }
        let StepOutput {
            patch,
            phase,
            point,
            feedback,
        } = M::step(M::state(store), self.phase);
        M::update(store, &patch);
        self.phase = phase;
        self.chart.push(point);
        self.feedback.extend(feedback);
        true
    }

    /// Runs every tick `scheduler` reports due. Ticks that fall due while the
    /// clock is not running are dropped.
    pub fn pump(&mut self, store: &mut AppStore, scheduler: &mut impl Scheduler) -> u64 {
        let due = scheduler.due_ticks();
        let mut delivered = 0;
        for _ in 0..due {
            if !self.tick(store) {
                break;
            }
            delivered += 1;
        }
        delivered
    }

    /// Back to the initial snapshot with empty chart and feedback. Stops the
    /// clock.
    pub fn reset(&mut self, store: &mut AppStore) {
        M::reset(store);
        self.chart.clear();
        self.feedback.clear();
        self.phase = M::Phase::default();
        self.clock.stop();
    }

    pub(crate) fn note(&mut self, message: &str) {
        self.feedback.push(FeedbackEntry::new(message));
    }

    pub(crate) fn set_phase(&mut self, phase: M::Phase) {
        self.phase = phase;
    }
}
