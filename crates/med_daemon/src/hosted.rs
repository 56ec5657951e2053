//! Glue that lets one set of route handlers serve both simulators.

use crate::state::{Session, SimUpdate, UpdateCause};
use med_control::Treatment;
use med_core::{
    dka, format_elapsed, AppStore, Dka, DkaState, Sepsis, SepsisOutcome, SepsisState, Simulator,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

pub trait HostedSimulator:
    Treatment<State: Serialize, Patch: DeserializeOwned + Send, Action: DeserializeOwned + Send>
    + Send
    + Sync
    + 'static
{
    fn simulator(session: &Session) -> &Simulator<Self>;
    fn parts(session: &mut Session) -> (&mut Simulator<Self>, &mut AppStore);
    fn time_elapsed(state: &Self::State) -> u32;
    /// Read-only views computed from the current state.
    fn derived(sim: &Simulator<Self>, store: &AppStore) -> Value;
}

impl HostedSimulator for Sepsis {
    fn simulator(session: &Session) -> &Simulator<Self> {
        &session.sepsis
    }

    fn parts(session: &mut Session) -> (&mut Simulator<Self>, &mut AppStore) {
        (&mut session.sepsis, &mut session.store)
    }

    fn time_elapsed(state: &SepsisState) -> u32 {
        state.time_elapsed
    }

    fn derived(sim: &Simulator<Self>, store: &AppStore) -> Value {
        let outcome = sim.outcome(store);
        json!({
            "elapsed": format_elapsed(store.sepsis().time_elapsed),
            "outcome": outcome,
            "outcome_message": outcome.map(SepsisOutcome::message),
        })
    }
}

impl HostedSimulator for Dka {
    fn simulator(session: &Session) -> &Simulator<Self> {
        &session.dka
    }

    fn parts(session: &mut Session) -> (&mut Simulator<Self>, &mut AppStore) {
        (&mut session.dka, &mut session.store)
    }

    fn time_elapsed(state: &DkaState) -> u32 {
        state.time_elapsed
    }

    fn derived(sim: &Simulator<Self>, store: &AppStore) -> Value {
        json!({
            "elapsed": format_elapsed(store.dka().time_elapsed),
            "phase": sim.phase(),
            "potassium_critical": sim.potassium_critical(store),
            "resolved": dka::resolved(store.dka()),
        })
    }
}

/// Full view of one simulator for `GET /api/v1/{sim}`.
pub fn view<M: HostedSimulator>(session: &Session) -> Value {
    let sim = M::simulator(session);
    json!({
        "simulator": M::NAME,
        "running": sim.is_running(),
        "clock": sim.clock_state(),
        "state": M::state(&session.store),
        "chart": sim.chart(),
        "feedback": sim.feedback().entries(),
        "derived": M::derived(sim, &session.store),
    })
}

/// Update describing `M` now, carrying feedback from index `feedback_from` on.
pub fn update<M: HostedSimulator>(
    session: &Session,
    cause: UpdateCause,
    feedback_from: usize,
) -> SimUpdate {
    let sim = M::simulator(session);
    let state = M::state(&session.store);
    SimUpdate {
        simulator: M::NAME,
        cause,
        time_elapsed: M::time_elapsed(state),
        running: sim.is_running(),
        state: serde_json::to_value(state).unwrap_or_default(),
        feedback: sim
            .feedback()
            .entries()
            .get(feedback_from..)
            .unwrap_or_default()
            .to_vec(),
    }
}
