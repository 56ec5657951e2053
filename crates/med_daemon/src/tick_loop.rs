use crate::hosted::{self, HostedSimulator};
use crate::state::{Session, SharedSession, SimUpdate, UpdateCause, UpdateTx};
use med_core::{Dka, Sepsis};
use std::time::Duration;

fn tick_one<M: HostedSimulator>(session: &mut Session, updates: &mut Vec<SimUpdate>) {
    let from = M::simulator(session).feedback().len();
    let (sim, store) = M::parts(session);
    if sim.tick(store) {
        updates.push(hosted::update::<M>(session, UpdateCause::Tick, from));
    }
}

/// Delivers one tick to every running simulator.
pub fn tick_session(session: &mut Session) -> Vec<SimUpdate> {
    let mut updates = Vec::new();
    tick_one::<Sepsis>(session, &mut updates);
    tick_one::<Dka>(session, &mut updates);
    updates
}

/// Drives the session clock until both simulators are disposed.
pub async fn run_tick_loop(session: SharedSession, update_tx: UpdateTx, ticks_per_sec: f64) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / ticks_per_sec));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
    // The first tick completes immediately; a simulation second has not passed yet.
    interval.tick().await;

    loop {
        interval.tick().await;
        let updates = {
            let mut guard = session.lock();
            if guard.is_disposed() {
                break;
            }
            tick_session(&mut guard)
        };
        for update in updates {
            let _ = update_tx.send(update);
        }
    }
    tracing::info!("tick loop stopped");
}
