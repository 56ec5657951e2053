use super::*;

#[test]
fn test_two_boluses_then_one_tick() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    assert_eq!(store.sepsis().fluid_given, 2000);

    assert_eq!(run_ticks(&mut sim, &mut store, 1), 1);

    let state = store.sepsis();
    assert_eq!(state.map, 57);
    assert_close(state.lactate, 4.0);
    assert_eq!(state.urine_output, 10);
    assert_eq!(state.time_elapsed, 1);
}

#[test]
fn test_tick_appends_chart_point_at_new_time() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    run_ticks(&mut sim, &mut store, 3);

    let ticks: Vec<u32> = sim.chart().points().iter().map(|p| p.tick).collect();
    assert_eq!(ticks, vec![1, 2, 3]);
    let last = sim.chart().last().unwrap();
    assert_close(last.value("lactate").unwrap(), 4.2);
    assert_close(last.value("map").unwrap(), 55.0);
}

#[test]
fn test_fluid_feedback_at_one_and_two_litres() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);

    let messages: Vec<&str> = sim.feedback().entries().iter().map(FeedbackEntry::message).collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("Started fluid resuscitation"));
    assert!(messages[1].contains("Adequate fluid resuscitation"));
    assert!(messages[2].contains("Adequate fluid resuscitation"));
    assert_eq!(store.sepsis().fluid_given, 3000);
}

#[test]
fn test_antibiotics_timely_then_noop() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_antibiotics(&mut store);
    sim.give_antibiotics(&mut store);

    assert!(store.sepsis().antibiotics_given);
    assert_eq!(sim.feedback().len(), 1);
    assert_eq!(sim.feedback().last().unwrap().level(), FeedbackLevel::Success);
}

#[test]
fn test_antibiotics_delayed_warns() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    run_ticks(&mut sim, &mut store, 60);
    sim.give_antibiotics(&mut store);

    let entry = sim.feedback().last().unwrap();
    assert_eq!(entry.level(), FeedbackLevel::Warning);
    assert!(entry.message().contains("mortality"));
}

#[test]
fn test_vasopressor_before_fluids_warns_once() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.start_vasopressor(&mut store);
    sim.start_vasopressor(&mut store);

    assert!(store.sepsis().vasopressor_used);
    assert_eq!(sim.feedback().len(), 1);
    assert_eq!(sim.feedback().last().unwrap().level(), FeedbackLevel::Warning);
}

#[test]
fn test_actions_apply_while_clock_stopped() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    assert!(!sim.is_running());
    sim.apply_action(&mut store, SepsisAction::GiveFluid);
    assert_eq!(store.sepsis().fluid_given, 1000);
    assert_eq!(store.sepsis().time_elapsed, 0);
}

#[test]
fn test_guideline_course_stabilizes() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_antibiotics(&mut store);
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    assert_eq!(sim.outcome(&store), None);

    // Fluids alone floor lactate at 2.0 and MAP at 65.
    run_ticks(&mut sim, &mut store, 12);

    let state = store.sepsis();
    assert_eq!(state.map, 65);
    assert_close(state.lactate, 2.0);
    assert_eq!(sim.outcome(&store), Some(SepsisOutcome::Stabilized));
}

#[test]
fn test_untreated_course_reports_delay() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    run_ticks(&mut sim, &mut store, 181);
    assert_eq!(sim.outcome(&store), Some(SepsisOutcome::Delayed));
    assert!(SepsisOutcome::Delayed.message().contains("delays"));
}

#[test]
fn test_antibiotics_clear_lactate_after_onset() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_antibiotics(&mut store);
    run_ticks(&mut sim, &mut store, 61);
    assert_close(store.sepsis().lactate, 4.2);

    // Pre-tick time is now 61.
    run_ticks(&mut sim, &mut store, 1);
    assert_close(store.sepsis().lactate, 4.1);
}
