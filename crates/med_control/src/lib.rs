use med_core::dka::{self, ADEQUATE_FLUID_ML as DKA_ADEQUATE_FLUID_ML, DEXTROSE_GLUCOSE_THRESHOLD};
use med_core::sepsis::{ADEQUATE_FLUID_ML as SEPSIS_ADEQUATE_FLUID_ML, MAP_TARGET};
use med_core::{
    ActionParseError, AppStore, Dka, DkaAction, DkaState, PhysiologyModel, Sepsis, SepsisAction,
    SepsisState, Simulator,
};
use std::str::FromStr;
use thiserror::Error;

/// A physiology model whose simulator accepts treatment actions as values.
pub trait Treatment: PhysiologyModel + Sized {
    type Action: Copy + std::fmt::Debug + FromStr<Err = ActionParseError>;

    fn apply(sim: &mut Simulator<Self>, store: &mut AppStore, action: Self::Action);
}

impl Treatment for Sepsis {
    type Action = SepsisAction;

    fn apply(sim: &mut Simulator<Self>, store: &mut AppStore, action: SepsisAction) {
        sim.apply_action(store, action);
    }
}

impl Treatment for Dka {
    type Action = DkaAction;

    fn apply(sim: &mut Simulator<Self>, store: &mut AppStore, action: DkaAction) {
        sim.apply_action(store, action);
    }
}

/// Decides which treatment actions to take before the next tick.
pub trait ActionSource<M: Treatment> {
    fn generate_actions(&mut self, state: &M::State) -> Vec<M::Action>;
}

/// Applies whatever `source` wants now, then delivers one tick.
/// Returns whether the tick was delivered.
pub fn step_session<M: Treatment>(
    sim: &mut Simulator<M>,
    store: &mut AppStore,
    source: &mut (impl ActionSource<M> + ?Sized),
) -> bool {
    let actions = source.generate_actions(M::state(store));
    for action in actions {
        M::apply(sim, store, action);
    }
    sim.tick(store)
}

// ---------------------------------------------------------------------------
// Guideline protocols
// ---------------------------------------------------------------------------

/// Sepsis bundle:
/// 1. Antibiotics as soon as possible.
/// 2. Crystalloid bolus until 30 mL/kg has been given.
/// 3. Vasopressor only if MAP is still below target after adequate fluids.
#[derive(Debug, Default)]
pub struct GuidelineSepsisProtocol;

impl ActionSource<Sepsis> for GuidelineSepsisProtocol {
    fn generate_actions(&mut self, state: &SepsisState) -> Vec<SepsisAction> {
        let mut actions = Vec::new();
        if !state.antibiotics_given {
            actions.push(SepsisAction::GiveAntibiotics);
        }
        if state.fluid_given < SEPSIS_ADEQUATE_FLUID_ML {
            actions.push(SepsisAction::GiveFluid);
        } else if state.map < MAP_TARGET && !state.vasopressor_used {
            actions.push(SepsisAction::StartVasopressor);
        }
        actions
    }
}

/// DKA protocol:
/// 1. IV fluids up to 2 L.
/// 2. Insulin once 1 L is in and potassium is safe.
/// 3. Dextrose once glucose falls below 250, keeping insulin running.
/// 4. Subcutaneous transition once resolved.
#[derive(Debug, Default)]
pub struct GuidelineDkaProtocol {
    dextrose_added: bool,
}

impl ActionSource<Dka> for GuidelineDkaProtocol {
    fn generate_actions(&mut self, state: &DkaState) -> Vec<DkaAction> {
        let mut actions = Vec::new();
        if state.transitioned_to_sq {
            return actions;
        }
        if state.fluid_given < DKA_ADEQUATE_FLUID_ML {
            actions.push(DkaAction::GiveFluid);
        }
        let fluids_in = state.fluid_given >= dka::FLUID_BOLUS_ML;
        if dka::resolved(state) {
            actions.push(DkaAction::TransitionToSq);
        } else if fluids_in
            && !state.insulin_running()
            && state.potassium >= dka::INSULIN_POTASSIUM_FLOOR
        {
            actions.push(DkaAction::StartInsulin);
        }
        if !self.dextrose_added
            && state.insulin_running()
            && state.glucose < DEXTROSE_GLUCOSE_THRESHOLD
        {
            self.dextrose_added = true;
            actions.push(DkaAction::AddDextrose);
        }
        actions
    }
}

// ---------------------------------------------------------------------------
// Scripted actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script entry '{0}' is not of the form <time>:<action>")]
    Malformed(String),
    #[error("script entry '{entry}' has an invalid time")]
    BadTime { entry: String },
    #[error(transparent)]
    UnknownAction(#[from] ActionParseError),
}

/// Actions keyed by the `timeElapsed` at which they fire, parsed from
/// `"0:fluid,0:antibiotics,30:vasopressor"`.
#[derive(Debug, Clone)]
pub struct ScriptedActions<A> {
    /// Sorted by time; entries with equal time keep script order.
    entries: Vec<(u32, A)>,
    cursor: usize,
}

impl<A: Copy + FromStr<Err = ActionParseError>> ScriptedActions<A> {
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut entries = Vec::new();
        for raw in script.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (time, action) = raw
                .split_once(':')
                .ok_or_else(|| ScriptError::Malformed(raw.to_string()))?;
            let time: u32 = time.trim().parse().map_err(|_| ScriptError::BadTime {
                entry: raw.to_string(),
            })?;
            entries.push((time, action.parse::<A>()?));
        }
        entries.sort_by_key(|(time, _)| *time);
        Ok(Self { entries, cursor: 0 })
    }

    pub fn remaining(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Actions whose time has come, in script order. Each fires once.
    pub fn due(&mut self, time_elapsed: u32) -> Vec<A> {
        let start = self.cursor;
        while self
            .entries
            .get(self.cursor)
            .is_some_and(|(time, _)| *time <= time_elapsed)
        {
            self.cursor += 1;
        }
        self.entries[start..self.cursor]
            .iter()
            .map(|(_, action)| *action)
            .collect()
    }
}

impl ActionSource<Sepsis> for ScriptedActions<SepsisAction> {
    fn generate_actions(&mut self, state: &SepsisState) -> Vec<SepsisAction> {
        self.due(state.time_elapsed)
    }
}

impl ActionSource<Dka> for ScriptedActions<DkaAction> {
    fn generate_actions(&mut self, state: &DkaState) -> Vec<DkaAction> {
        self.due(state.time_elapsed)
    }
}

/// Takes no actions; the patient is left untreated.
#[derive(Debug, Default)]
pub struct NoActions;

impl<M: Treatment> ActionSource<M> for NoActions {
    fn generate_actions(&mut self, _state: &M::State) -> Vec<M::Action> {
        Vec::new()
    }
}
