use super::*;

#[test]
fn test_start_insulin_then_one_tick() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.start_insulin(&mut store);
    assert_close(store.dka().insulin_rate, 0.1);
    assert_eq!(sim.phase(), DkaPhase::Insulin);

    run_ticks(&mut sim, &mut store, 1);

    let state = store.dka();
    assert_eq!(state.glucose, 435);
    assert_close(state.ph, 7.16);
    // 27.5 and 3.75 round half away from zero.
    assert_eq!(state.anion_gap, 28);
    assert_close(state.potassium, 3.8);
}

#[test]
fn test_insulin_before_fluids_warns_but_proceeds() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.start_insulin(&mut store);

    let levels: Vec<FeedbackLevel> = sim.feedback().entries().iter().map(FeedbackEntry::level).collect();
    assert_eq!(levels, vec![FeedbackLevel::Warning, FeedbackLevel::Success]);
}

#[test]
fn test_insulin_refused_with_low_potassium() {
    let mut store = dka_store(DkaState {
        potassium: 3.2,
        ..DkaState::initial()
    });
    let mut sim = DkaSimulator::new();
    let before = store.dka().clone();
    sim.start_insulin(&mut store);

    assert_eq!(store.dka(), &before);
    assert_eq!(sim.phase(), DkaPhase::Initial);
    assert_eq!(sim.feedback().last().unwrap().level(), FeedbackLevel::Danger);
    assert!(sim.potassium_critical(&store));
}

#[test]
fn test_second_insulin_start_is_noop() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.give_fluid(&mut store);
    sim.start_insulin(&mut store);
    let entries = sim.feedback().len();
    sim.start_insulin(&mut store);
    assert_eq!(sim.feedback().len(), entries);
}

#[test]
fn test_safety_gate_halts_insulin() {
    let mut store = dka_store(DkaState {
        insulin_rate: 0.1,
        potassium: 3.2,
        ..DkaState::initial()
    });
    let mut sim = DkaSimulator::new();
    let before = store.dka().clone();

    run_ticks(&mut sim, &mut store, 1);

    let state = store.dka();
    assert_close(state.insulin_rate, 0.0);
    assert_eq!(state.glucose, before.glucose);
    assert_eq!(state.anion_gap, before.anion_gap);
    assert_close(state.ph, before.ph);
    assert_eq!(sim.feedback().count_at(FeedbackLevel::Danger), 1);
}

#[test]
fn test_fluid_phase_and_feedback() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    // Messages only at 1000 and 2000.
    assert_eq!(sim.feedback().len(), 2);

    run_ticks(&mut sim, &mut store, 2);
    assert_eq!(sim.phase(), DkaPhase::Fluids);
    assert_eq!(
        sim.feedback()
            .entries()
            .iter()
            .filter(|e| e.message().contains("Fluid resuscitation initiated"))
            .count(),
        1
    );
    // Replacement runs past 1 L: 3.8 + 0.02 rounds back to 3.8.
    assert_close(store.dka().potassium, 3.8);
}

#[test]
fn test_dextrose_is_advisory() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    let before = store.dka().clone();
    sim.add_dextrose(&store);
    assert_eq!(store.dka(), &before);
    assert_eq!(sim.feedback().last().unwrap().level(), FeedbackLevel::Warning);

    let store = dka_store(DkaState {
        glucose: 240,
        ..DkaState::initial()
    });
    sim.add_dextrose(&store);
    assert_eq!(sim.feedback().last().unwrap().level(), FeedbackLevel::Success);
}

#[test]
fn test_transition_rejected_until_resolved() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.transition_to_sq(&mut store);
    assert!(!store.dka().transitioned_to_sq);
    assert!(sim.feedback().last().unwrap().message().contains("Not ready"));
}

#[test]
fn test_resolution_then_transition() {
    let mut store = dka_store(DkaState {
        insulin_rate: 0.1,
        fluid_given: 2000,
        glucose: 200,
        ph: 7.3,
        anion_gap: 11,
        ..DkaState::initial()
    });
    let mut sim = DkaSimulator::new();

    run_ticks(&mut sim, &mut store, 1);
    assert_close(store.dka().ph, 7.31);
    assert_eq!(sim.phase(), DkaPhase::Resolution);
    assert!(!store.dka().transitioned_to_sq);

    // Resolution feedback is emitted on entry only.
    run_ticks(&mut sim, &mut store, 3);
    assert_eq!(
        sim.feedback()
            .entries()
            .iter()
            .filter(|e| e.message().contains("DKA resolved!"))
            .count(),
        1
    );

    sim.transition_to_sq(&mut store);
    let state = store.dka();
    assert!(state.transitioned_to_sq);
    assert_close(state.insulin_rate, 0.0);
    assert_eq!(sim.phase(), DkaPhase::Resolution);
}

#[test]
fn test_glucose_falls_to_floor_on_insulin() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.give_fluid(&mut store);
    sim.start_insulin(&mut store);
    run_ticks(&mut sim, &mut store, 40);

    let state = store.dka();
    assert_eq!(state.glucose, 150);
    assert_close(state.ph, 7.35);
    assert_eq!(state.time_elapsed, 40);
}

#[test]
fn test_elapsed_formatting() {
    assert_eq!(format_elapsed(0), "0:00");
    assert_eq!(format_elapsed(65), "1:05");
    assert_eq!(format_elapsed(600), "10:00");
}
