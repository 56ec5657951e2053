use super::*;

#[test]
fn test_stopped_clock_drops_due_ticks() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    let mut scheduler = ManualScheduler::new();
    scheduler.advance(5);
    assert_eq!(sim.pump(&mut store, &mut scheduler), 0);
    assert_eq!(store.sepsis().time_elapsed, 0);

    // Ticks that fell due while stopped are not replayed.
    sim.start();
    assert_eq!(sim.pump(&mut store, &mut scheduler), 0);
    scheduler.advance(2);
    assert_eq!(sim.pump(&mut store, &mut scheduler), 2);
    assert_eq!(store.sepsis().time_elapsed, 2);
}

#[test]
fn test_start_twice_does_not_double_tick() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    assert!(sim.start());
    assert!(!sim.start());
    let mut scheduler = ManualScheduler::new();
    scheduler.advance(1);
    sim.pump(&mut store, &mut scheduler);
    assert_eq!(store.dka().time_elapsed, 1);
}

#[test]
fn test_toggle_pauses_and_resumes() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    assert!(sim.toggle());
    assert!(sim.tick(&mut store));
    assert!(!sim.toggle());
    assert!(!sim.tick(&mut store));
    assert!(!sim.stop());
    assert!(sim.toggle());
    assert!(sim.tick(&mut store));
    assert_eq!(store.sepsis().time_elapsed, 2);
}

#[test]
fn test_disposed_simulator_never_ticks() {
    let mut store = AppStore::in_memory();
    let mut sim = DkaSimulator::new();
    sim.start();
    sim.dispose();
    assert!(!sim.start());
    assert_eq!(run_ticks(&mut sim, &mut store, 10), 0);
    assert_eq!(*store.dka(), DkaState::initial());
    assert_eq!(sim.clock_state(), ClockState::Disposed);
}

#[test]
fn test_wall_scheduler_counts_elapsed_periods() {
    let mut scheduler = WallScheduler::new(std::time::Duration::from_millis(5));
    std::thread::sleep(std::time::Duration::from_millis(12));
    let due = scheduler.due_ticks();
    assert!(due >= 2, "expected at least two periods, got {due}");
    assert_eq!(scheduler.due_ticks(), 0);
}
