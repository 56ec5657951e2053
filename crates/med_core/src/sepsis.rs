//! Sepsis resuscitation model: fluids, early antibiotics, vasopressors.

use crate::chart::ChartPoint;
use crate::simulator::{PhysiologyModel, Simulator, StepOutput};
use crate::store::AppStore;
use crate::types::{round_to, round_to_int, SepsisPatch, SepsisState};
use serde::{Deserialize, Serialize};

pub const FLUID_BOLUS_ML: u32 = 1000;
/// Total crystalloid (~30 mL/kg) that counts as adequate resuscitation.
pub const ADEQUATE_FLUID_ML: u32 = 2000;
/// Antibiotics given before this many seconds are on time.
pub const ANTIBIOTIC_WINDOW: u32 = 60;
/// Antibiotics start clearing lactate once this much time has passed.
pub const ANTIBIOTIC_ONSET: u32 = 60;
pub const MAP_TARGET: i32 = 65;
pub const LACTATE_TARGET: f64 = 3.0;
/// Past this point an unmet target is reported as delayed care.
pub const DELAYED_CARE_AFTER: u32 = 180;

const FLUID_MAP_GAIN: f64 = 2.0;
const FLUID_MAP_CEILING: f64 = 65.0;
const FLUID_LACTATE_CLEARANCE: f64 = 0.2;
const FLUID_LACTATE_FLOOR: f64 = 2.0;
const FLUID_URINE_GAIN: u32 = 10;
const ANTIBIOTIC_LACTATE_CLEARANCE: f64 = 0.1;
const ANTIBIOTIC_LACTATE_FLOOR: f64 = 1.5;
const VASOPRESSOR_MAP_GAIN: f64 = 3.0;
const VASOPRESSOR_MAP_CEILING: f64 = 70.0;

pub struct Sepsis;

impl PhysiologyModel for Sepsis {
    type State = SepsisState;
    type Patch = SepsisPatch;
    type Phase = ();

    const NAME: &'static str = "sepsis";

    fn step(state: &SepsisState, (): ()) -> StepOutput<SepsisPatch, ()> {
        let (patch, point) = step(state);
        StepOutput {
            patch,
            phase: (),
            point,
            feedback: Vec::new(),
        }
    }

    fn state(store: &AppStore) -> &SepsisState {
        store.sepsis()
    }

    fn update(store: &mut AppStore, patch: &SepsisPatch) {
        store.update_sepsis(patch);
    }

    fn reset(store: &mut AppStore) {
        store.reset_sepsis();
    }
}

/// One tick of the sepsis rule.
///
/// Every right-hand side reads `state` as it was before the tick, except that
/// the antibiotic and vasopressor adjustments build on the fluid-adjusted
/// lactate and MAP.
pub fn step(state: &SepsisState) -> (SepsisPatch, ChartPoint) {
    let time_elapsed = state.time_elapsed.saturating_add(1);
    let mut map = f64::from(state.map);
    let mut lactate = state.lactate;
    let mut urine_output = state.urine_output;

    if state.fluid_given >= ADEQUATE_FLUID_ML {
        map = (f64::from(state.map) + FLUID_MAP_GAIN).min(FLUID_MAP_CEILING);
        lactate = (state.lactate - FLUID_LACTATE_CLEARANCE).max(FLUID_LACTATE_FLOOR);
        urine_output = urine_output.saturating_add(FLUID_URINE_GAIN);
    }

    if state.antibiotics_given && state.time_elapsed > ANTIBIOTIC_ONSET {
        lactate = (lactate - ANTIBIOTIC_LACTATE_CLEARANCE).max(ANTIBIOTIC_LACTATE_FLOOR);
    }

    if state.vasopressor_used {
        map = (map + VASOPRESSOR_MAP_GAIN).min(VASOPRESSOR_MAP_CEILING);
    }

    let map = round_to_int(map);
    let lactate = round_to(lactate, 1);

    let point = ChartPoint::new(
        time_elapsed,
        &[("lactate", lactate), ("map", f64::from(map))],
    );
    let patch = SepsisPatch {
        time_elapsed: Some(time_elapsed),
        lactate: Some(lactate),
        map: Some(map),
        urine_output: Some(urine_output),
        ..SepsisPatch::default()
    };
    (patch, point)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SepsisOutcome {
    Stabilized,
    Delayed,
}

impl SepsisOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Stabilized => {
                "Excellent management! Patient stabilized with appropriate early interventions."
            }
            Self::Delayed => {
                "Patient survived but delays in treatment may have increased morbidity."
            }
        }
    }
}

/// Computed on read; never stored.
pub fn outcome(state: &SepsisState) -> Option<SepsisOutcome> {
    let stabilized = state.antibiotics_given
        && state.fluid_given >= ADEQUATE_FLUID_ML
        && state.lactate < LACTATE_TARGET
        && state.map >= MAP_TARGET;
    if stabilized {
        Some(SepsisOutcome::Stabilized)
    } else if state.time_elapsed > DELAYED_CARE_AFTER {
        Some(SepsisOutcome::Delayed)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SepsisAction {
    GiveFluid,
    GiveAntibiotics,
    StartVasopressor,
}

impl std::str::FromStr for SepsisAction {
    type Err = crate::ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fluid" | "give_fluid" => Ok(Self::GiveFluid),
            "antibiotics" | "give_antibiotics" => Ok(Self::GiveAntibiotics),
            "vasopressor" | "start_vasopressor" => Ok(Self::StartVasopressor),
            other => Err(crate::ActionParseError(other.to_string())),
        }
    }
}

impl Simulator<Sepsis> {
    pub fn apply_action(&mut self, store: &mut AppStore, action: SepsisAction) {
        match action {
            SepsisAction::GiveFluid => self.give_fluid(store),
            SepsisAction::GiveAntibiotics => self.give_antibiotics(store),
            SepsisAction::StartVasopressor => self.start_vasopressor(store),
        }
    }

    pub fn give_fluid(&mut self, store: &mut AppStore) {
        let total = store.sepsis().fluid_given.saturating_add(FLUID_BOLUS_ML);
        store.update_sepsis(&SepsisPatch {
            fluid_given: Some(total),
            ..SepsisPatch::default()
        });
        if total == FLUID_BOLUS_ML {
            self.note("✓ Started fluid resuscitation - Good! Continue to 30 mL/kg.");
        } else if total >= ADEQUATE_FLUID_ML {
            self.note("✓ Adequate fluid resuscitation achieved. Monitor for response.");
        }
    }

    pub fn give_antibiotics(&mut self, store: &mut AppStore) {
        let state = store.sepsis();
        if state.antibiotics_given {
            return;
        }
        let on_time = state.time_elapsed < ANTIBIOTIC_WINDOW;
        store.update_sepsis(&SepsisPatch {
            antibiotics_given: Some(true),
            ..SepsisPatch::default()
        });
        if on_time {
            self.note("✓ Excellent! Antibiotics given within 1 hour.");
        } else {
            self.note("⚠ Antibiotics given, but delayed. Each hour delay increases mortality.");
        }
    }

    pub fn start_vasopressor(&mut self, store: &mut AppStore) {
        let state = store.sepsis();
        if state.vasopressor_used {
            return;
        }
        let after_fluids = state.fluid_given >= ADEQUATE_FLUID_ML;
        store.update_sepsis(&SepsisPatch {
            vasopressor_used: Some(true),
            ..SepsisPatch::default()
        });
        if after_fluids {
            self.note("✓ Starting vasopressor after adequate fluids - appropriate for septic shock.");
        } else {
            self.note(
                "⚠ Vasopressor started, but consider more fluids first if patient is fluid-responsive.",
            );
        }
    }

    pub fn outcome(&self, store: &AppStore) -> Option<SepsisOutcome> {
        outcome(store.sepsis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_treatment_only_advances_time() {
        let state = SepsisState::initial();
        let (patch, point) = step(&state);
        assert_eq!(patch.time_elapsed, Some(1));
        assert_eq!(patch.map, Some(55));
        assert_eq!(patch.urine_output, Some(0));
        assert_eq!(point.tick, 1);
    }

    #[test]
    fn fluid_map_gain_caps_at_65() {
        let state = SepsisState {
            fluid_given: 2000,
            map: 64,
            ..SepsisState::initial()
        };
        let (patch, _) = step(&state);
        assert_eq!(patch.map, Some(65));
    }

    #[test]
    fn antibiotics_wait_for_onset() {
        let early = SepsisState {
            antibiotics_given: true,
            time_elapsed: 60,
            ..SepsisState::initial()
        };
        let (patch, _) = step(&early);
        assert!((patch.lactate.unwrap() - 4.2).abs() < 1e-9);

        let late = SepsisState {
            time_elapsed: 61,
            ..early
        };
        let (patch, _) = step(&late);
        assert!((patch.lactate.unwrap() - 4.1).abs() < 1e-9);
    }

    #[test]
    fn vasopressor_builds_on_fluid_adjusted_map() {
        let state = SepsisState {
            fluid_given: 2000,
            vasopressor_used: true,
            map: 64,
            ..SepsisState::initial()
        };
        let (patch, _) = step(&state);
        // 64 + 2 capped at 65, then + 3.
        assert_eq!(patch.map, Some(68));
    }

    #[test]
    fn outcome_requires_every_target() {
        let mut state = SepsisState {
            antibiotics_given: true,
            fluid_given: 2000,
            lactate: 2.9,
            map: 65,
            ..SepsisState::initial()
        };
        assert_eq!(outcome(&state), Some(SepsisOutcome::Stabilized));
        state.map = 64;
        assert_eq!(outcome(&state), None);
        state.time_elapsed = 181;
        assert_eq!(outcome(&state), Some(SepsisOutcome::Delayed));
    }

    #[test]
    fn action_names_parse() {
        assert_eq!("fluid".parse::<SepsisAction>().unwrap(), SepsisAction::GiveFluid);
        assert_eq!(
            " vasopressor ".parse::<SepsisAction>().unwrap(),
            SepsisAction::StartVasopressor
        );
        assert!("insulin".parse::<SepsisAction>().is_err());
    }
}
