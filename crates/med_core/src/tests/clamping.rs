use super::*;

fn assert_dka_bounds(state: &DkaState) {
    assert!(
        (DKA_POTASSIUM_FLOOR..=DKA_POTASSIUM_CEILING).contains(&state.potassium),
        "potassium {} out of range",
        state.potassium
    );
    assert!(state.ph <= DKA_PH_CEILING, "ph {} above ceiling", state.ph);
    assert!(state.anion_gap >= DKA_ANION_GAP_FLOOR);
    assert!(state.glucose >= DKA_GLUCOSE_FLOOR);
}

fn assert_sepsis_bounds(state: &SepsisState) {
    assert!(state.map <= SEPSIS_MAP_CEILING, "map {} above ceiling", state.map);
    assert!(
        state.lactate >= SEPSIS_LACTATE_FLOOR,
        "lactate {} below floor",
        state.lactate
    );
}

#[test]
fn test_out_of_range_patch_is_clamped() {
    let mut store = AppStore::in_memory();
    store.update_dka(&DkaPatch {
        potassium: Some(9.0),
        ph: Some(7.9),
        anion_gap: Some(-4),
        glucose: Some(20),
        ..DkaPatch::default()
    });
    assert_dka_bounds(store.dka());
    assert_close(store.dka().potassium, 5.0);

    store.update_dka(&DkaPatch {
        potassium: Some(0.5),
        ..DkaPatch::default()
    });
    assert_close(store.dka().potassium, 3.0);

    store.update_sepsis(&SepsisPatch {
        map: Some(140),
        lactate: Some(0.2),
        ..SepsisPatch::default()
    });
    assert_sepsis_bounds(store.sepsis());
}

#[test]
fn test_dka_ticks_stay_in_bounds_from_extremes() {
    let starts = [
        (DKA_POTASSIUM_FLOOR, 7.34, 10, 150),
        (DKA_POTASSIUM_CEILING, 7.0, 40, 900),
        (3.3, 7.35, 11, 151),
        (3.2, 6.9, 30, 600),
    ];
    for (potassium, ph, anion_gap, glucose) in starts {
        for fluid_given in [0, 1000, 2000] {
            let mut store = dka_store(DkaState {
                fluid_given,
                insulin_rate: 0.1,
                potassium,
                ph,
                anion_gap,
                glucose,
                ..DkaState::initial()
            });
            let mut sim = DkaSimulator::new();
            sim.start();
            let mut scheduler = ManualScheduler::new();
            for _ in 0..80 {
                scheduler.advance(1);
                sim.pump(&mut store, &mut scheduler);
                assert_dka_bounds(store.dka());
            }
        }
    }
}

#[test]
fn test_sepsis_ticks_stay_in_bounds_with_every_intervention() {
    let mut store = AppStore::in_memory();
    let mut sim = SepsisSimulator::new();
    sim.give_fluid(&mut store);
    sim.give_fluid(&mut store);
    sim.give_antibiotics(&mut store);
    sim.start_vasopressor(&mut store);
    sim.start();
    let mut scheduler = ManualScheduler::new();
    for _ in 0..200 {
        scheduler.advance(1);
        sim.pump(&mut store, &mut scheduler);
        assert_sepsis_bounds(store.sepsis());
    }
    // Fluids re-cap MAP at 65 before the vasopressor adds 3, and re-floor
    // lactate at 2.0 before antibiotics take 0.1.
    assert_eq!(store.sepsis().map, 68);
    assert_close(store.sepsis().lactate, 1.9);
}

#[test]
fn test_time_advances_by_exactly_n() {
    for n in [0_u64, 1, 7, 90] {
        let mut store = AppStore::in_memory();
        let mut sepsis = SepsisSimulator::new();
        let mut dka = DkaSimulator::new();
        run_ticks(&mut sepsis, &mut store, n);
        run_ticks(&mut dka, &mut store, n);
        assert_eq!(u64::from(store.sepsis().time_elapsed), n);
        assert_eq!(u64::from(store.dka().time_elapsed), n);
        assert_eq!(sepsis.chart().len() as u64, n);
    }
}

#[test]
fn test_time_patch_cannot_rewind_a_running_clock() {
    let mut store = AppStore::in_memory();
    let mut sepsis = SepsisSimulator::new();
    let mut dka = DkaSimulator::new();
    run_ticks(&mut sepsis, &mut store, 2);
    run_ticks(&mut dka, &mut store, 2);

    store.update_sepsis(&SepsisPatch {
        time_elapsed: Some(0),
        ..SepsisPatch::default()
    });
    store.update_dka(&DkaPatch {
        time_elapsed: Some(0),
        ..DkaPatch::default()
    });
    assert_eq!(store.sepsis().time_elapsed, 2);
    assert_eq!(store.dka().time_elapsed, 2);

    run_ticks(&mut sepsis, &mut store, 1);
    run_ticks(&mut dka, &mut store, 1);
    assert_eq!(store.sepsis().time_elapsed, 3);
    assert_eq!(store.dka().time_elapsed, 3);
    let ticks: Vec<u32> = sepsis.chart().points().iter().map(|p| p.tick).collect();
    assert_eq!(ticks, vec![1, 2, 3]);

    // Forward jumps are still accepted.
    store.update_dka(&DkaPatch {
        time_elapsed: Some(10),
        ..DkaPatch::default()
    });
    run_ticks(&mut dka, &mut store, 1);
    assert_eq!(store.dka().time_elapsed, 11);
    assert_eq!(dka.chart().last().map(|p| p.tick), Some(11));
}

#[test]
fn test_counters_saturate_at_u32_max() {
    let mut store = AppStore::in_memory();
    store.update_sepsis(&SepsisPatch {
        time_elapsed: Some(u32::MAX),
        fluid_given: Some(u32::MAX),
        urine_output: Some(u32::MAX),
        ..SepsisPatch::default()
    });
    store.update_dka(&DkaPatch {
        time_elapsed: Some(u32::MAX),
        fluid_given: Some(u32::MAX),
        ..DkaPatch::default()
    });

    let mut sepsis = SepsisSimulator::new();
    let mut dka = DkaSimulator::new();
    sepsis.give_fluid(&mut store);
    dka.give_fluid(&mut store);
    run_ticks(&mut sepsis, &mut store, 2);
    run_ticks(&mut dka, &mut store, 2);

    let state = store.sepsis();
    assert_eq!(state.time_elapsed, u32::MAX);
    assert_eq!(state.fluid_given, u32::MAX);
    assert_eq!(state.urine_output, u32::MAX);
    assert_eq!(store.dka().time_elapsed, u32::MAX);
    assert_eq!(store.dka().fluid_given, u32::MAX);
    assert_eq!(sepsis.chart().len(), 2);
}
