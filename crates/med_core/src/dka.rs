//! Diabetic ketoacidosis model: fluids first, potassium before insulin,
//! dextrose once glucose falls, subcutaneous transition on resolution.

use crate::chart::ChartPoint;
use crate::feedback::FeedbackEntry;
use crate::simulator::{PhysiologyModel, Simulator, StepOutput};
use crate::store::AppStore;
use crate::types::{round_to, round_to_int, DkaPatch, DkaState};
use serde::{Deserialize, Serialize};

pub const FLUID_BOLUS_ML: u32 = 1000;
pub const ADEQUATE_FLUID_ML: u32 = 2000;
/// Insulin must not run below this potassium, mEq/L.
pub const INSULIN_POTASSIUM_FLOOR: f64 = 3.3;
/// units/kg/h.
pub const INSULIN_INFUSION_RATE: f64 = 0.1;
/// Dextrose is added once glucose drops below this, mg/dL.
pub const DEXTROSE_GLUCOSE_THRESHOLD: i32 = 250;
pub const RESOLUTION_PH: f64 = 7.3;
pub const RESOLUTION_ANION_GAP: i32 = 12;

const INSULIN_GLUCOSE_DROP: f64 = 15.0;
const INSULIN_GLUCOSE_FLOOR: f64 = 150.0;
const INSULIN_PH_RISE: f64 = 0.01;
const INSULIN_PH_CEILING: f64 = 7.35;
const INSULIN_ANION_GAP_DROP: f64 = 0.5;
const INSULIN_ANION_GAP_FLOOR: f64 = 10.0;
const INSULIN_POTASSIUM_DROP: f64 = 0.05;
const INSULIN_POTASSIUM_FLOOR_ON_DRIP: f64 = 3.0;
const REPLACEMENT_POTASSIUM_RISE: f64 = 0.02;
const REPLACEMENT_POTASSIUM_CEILING: f64 = 5.0;

const MSG_FLUIDS_INITIATED: &str = "✓ Fluid resuscitation initiated";
const MSG_POTASSIUM_DANGER: &str = "⚠ DANGER: Potassium too low! Stop insulin immediately!";
const MSG_RESOLVED: &str = "✓ DKA resolved! Consider transitioning to subcutaneous insulin.";

/// Treatment stage. Only ever moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DkaPhase {
    #[default]
    Initial,
    Fluids,
    Insulin,
    Resolution,
}

impl DkaPhase {
    /// `self` or `next`, whichever is further along.
    #[must_use]
    pub fn advanced_to(self, next: Self) -> Self {
        self.max(next)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Fluids => "fluids",
            Self::Insulin => "insulin",
            Self::Resolution => "resolution",
        }
    }
}

pub struct Dka;

impl PhysiologyModel for Dka {
    type State = DkaState;
    type Patch = DkaPatch;
    type Phase = DkaPhase;

    const NAME: &'static str = "dka";

    fn step(state: &DkaState, phase: DkaPhase) -> StepOutput<DkaPatch, DkaPhase> {
        step(state, phase)
    }

    fn state(store: &AppStore) -> &DkaState {
        store.dka()
    }

    fn update(store: &mut AppStore, patch: &DkaPatch) {
        store.update_dka(patch);
    }

    fn reset(store: &mut AppStore) {
        store.reset_dka();
    }
}

/// One tick of the DKA rule.
///
/// Order:
/// 1. Advance time.
/// 2. Enter the fluids phase once 1 L has been given.
/// 3. Halt insulin if it is running with potassium below 3.3.
/// 4. Otherwise, running insulin lowers glucose, anion gap and potassium and
///    raises pH.
/// 5. Past 1 L of fluids, replacement raises potassium.
/// 6. Round to recorded precision and emit a chart point.
/// 7. Enter resolution once pH > 7.3 and the anion gap is closed. The
///    "DKA resolved!" message is emitted only on that transition; later ticks
///    that remain resolved stay silent.
pub fn step(state: &DkaState, phase: DkaPhase) -> StepOutput<DkaPatch, DkaPhase> {
    let mut phase = phase;
    let mut feedback = Vec::new();
    let time_elapsed = state.time_elapsed.saturating_add(1);

    if state.fluid_given >= FLUID_BOLUS_ML && phase == DkaPhase::Initial {
        phase = DkaPhase::Fluids;
        feedback.push(FeedbackEntry::new(MSG_FLUIDS_INITIATED));
    }

    let mut glucose = f64::from(state.glucose);
    let mut ph = state.ph;
    let mut anion_gap = f64::from(state.anion_gap);
    let mut potassium = state.potassium;
    let mut insulin_rate = None;

    if state.insulin_running() && state.potassium < INSULIN_POTASSIUM_FLOOR {
        feedback.push(FeedbackEntry::new(MSG_POTASSIUM_DANGER));
        insulin_rate = Some(0.0);
    } else if state.insulin_running() {
        glucose = (f64::from(state.glucose) - INSULIN_GLUCOSE_DROP).max(INSULIN_GLUCOSE_FLOOR);
        ph = (state.ph + INSULIN_PH_RISE).min(INSULIN_PH_CEILING);
        anion_gap =
            (f64::from(state.anion_gap) - INSULIN_ANION_GAP_DROP).max(INSULIN_ANION_GAP_FLOOR);
        potassium =
            (state.potassium - INSULIN_POTASSIUM_DROP).max(INSULIN_POTASSIUM_FLOOR_ON_DRIP);
    }

    if state.fluid_given > FLUID_BOLUS_ML {
        potassium = (potassium + REPLACEMENT_POTASSIUM_RISE).min(REPLACEMENT_POTASSIUM_CEILING);
    }

    let glucose = round_to_int(glucose);
    let anion_gap = round_to_int(anion_gap);
    let potassium = round_to(potassium, 1);
    let ph = round_to(ph, 2);

    let point = ChartPoint::new(
        time_elapsed,
        &[
            ("glucose", f64::from(glucose)),
            ("ph", ph),
            ("potassium", potassium),
        ],
    );

    if is_resolved(ph, anion_gap) && !state.transitioned_to_sq && phase < DkaPhase::Resolution {
        phase = DkaPhase::Resolution;
        feedback.push(FeedbackEntry::new(MSG_RESOLVED));
    }

    StepOutput {
        patch: DkaPatch {
            time_elapsed: Some(time_elapsed),
            insulin_rate,
            glucose: Some(glucose),
            potassium: Some(potassium),
            ph: Some(ph),
            anion_gap: Some(anion_gap),
            ..DkaPatch::default()
        },
        phase,
        point,
        feedback,
    }
}

fn is_resolved(ph: f64, anion_gap: i32) -> bool {
    ph > RESOLUTION_PH && anion_gap < RESOLUTION_ANION_GAP
}

/// Ketoacidosis has cleared: pH above 7.3 and the anion gap closed.
pub fn resolved(state: &DkaState) -> bool {
    is_resolved(state.ph, state.anion_gap)
}

/// The "TOO LOW" indicator on the potassium panel.
pub fn potassium_critical(state: &DkaState) -> bool {
    state.potassium < INSULIN_POTASSIUM_FLOOR
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DkaAction {
    GiveFluid,
    StartInsulin,
    AddDextrose,
    TransitionToSq,
}

impl std::str::FromStr for DkaAction {
    type Err = crate::ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fluid" | "give_fluid" => Ok(Self::GiveFluid),
            "insulin" | "start_insulin" => Ok(Self::StartInsulin),
            "dextrose" | "add_dextrose" => Ok(Self::AddDextrose),
            "sq" | "transition_to_sq" => Ok(Self::TransitionToSq),
            other => Err(crate::ActionParseError(other.to_string())),
        }
    }
}

impl Simulator<Dka> {
    pub fn apply_action(&mut self, store: &mut AppStore, action: DkaAction) {
        match action {
            DkaAction::GiveFluid => self.give_fluid(store),
            DkaAction::StartInsulin => self.start_insulin(store),
            DkaAction::AddDextrose => self.add_dextrose(store),
            DkaAction::TransitionToSq => self.transition_to_sq(store),
        }
    }

    pub fn give_fluid(&mut self, store: &mut AppStore) {
        let total = store.dka().fluid_given.saturating_add(FLUID_BOLUS_ML);
        store.update_dka(&DkaPatch {
            fluid_given: Some(total),
            ..DkaPatch::default()
        });
        if total == FLUID_BOLUS_ML {
            self.note("✓ Started IV fluids - Good first step! Check potassium before insulin.");
        } else if total == ADEQUATE_FLUID_ML {
            self.note("✓ Adequate initial fluid resuscitation");
        }
    }

    /// Refused outright below the potassium floor. Starting before fluids is
    /// allowed with a warning.
    pub fn start_insulin(&mut self, store: &mut AppStore) {
        let state = store.dka();
        if state.potassium < INSULIN_POTASSIUM_FLOOR {
            self.note(
                "❌ CRITICAL ERROR: Cannot start insulin with K+ < 3.3 mEq/L! Risk of fatal arrhythmia!",
            );
            return;
        }
        let before_fluids = state.fluid_given < FLUID_BOLUS_ML;
        let already_running = state.insulin_running();

        if before_fluids {
            self.note("⚠ Warning: Start fluids before insulin for best outcomes");
        }
        if already_running {
            return;
        }
        store.update_dka(&DkaPatch {
            insulin_rate: Some(INSULIN_INFUSION_RATE),
            ..DkaPatch::default()
        });
        self.note("✓ Insulin infusion started at 0.1 units/kg/h");
        self.set_phase(self.phase().advanced_to(DkaPhase::Insulin));
    }

    /// Advisory only; never changes state.
    pub fn add_dextrose(&mut self, store: &AppStore) {
        if store.dka().glucose < DEXTROSE_GLUCOSE_THRESHOLD {
            self.note("✓ Adding dextrose to fluids - Continue insulin to clear ketosis!");
        } else {
            self.note("⚠ Glucose still high - wait until <250 mg/dL before adding dextrose");
        }
    }

    pub fn transition_to_sq(&mut self, store: &mut AppStore) {
        let state = store.dka();
        if !is_resolved(state.ph, state.anion_gap) {
            self.note("⚠ Not ready to transition - need pH >7.3 AND anion gap closed (<12)");
            return;
        }
        store.update_dka(&DkaPatch {
            transitioned_to_sq: Some(true),
            insulin_rate: Some(0.0),
            ..DkaPatch::default()
        });
        self.note("✓ Excellent! DKA resolved. Transition to SQ insulin with 1-2 hour overlap.");
        self.set_phase(self.phase().advanced_to(DkaPhase::Resolution));
    }

    pub fn potassium_critical(&self, store: &AppStore) -> bool {
        potassium_critical(store.dka())
    }
}
