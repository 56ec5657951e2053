use super::*;
use crate::test_fixtures::{memory_store, run_ticks, sample_library};

mod clamping;
mod clock;
mod dka;
mod sepsis;

// --- Shared test helpers ------------------------------------------------

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

fn dka_store(state: DkaState) -> AppStore {
    let mut store = AppStore::in_memory();
    store.update_dka(&DkaPatch {
        time_elapsed: Some(state.time_elapsed),
        fluid_given: Some(state.fluid_given),
        insulin_rate: Some(state.insulin_rate),
        glucose: Some(state.glucose),
        potassium: Some(state.potassium),
        ph: Some(state.ph),
        anion_gap: Some(state.anion_gap),
        transitioned_to_sq: Some(state.transitioned_to_sq),
    });
    store
}
