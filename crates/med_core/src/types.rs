//! Simulator state records and their typed partial updates.
//!
//! Field names serialize in camelCase so the persisted snapshot keeps the
//! `timeElapsed` / `fluidGiven` shape of the stored blob.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Physiologic bounds
// ---------------------------------------------------------------------------

pub const SEPSIS_MAP_CEILING: i32 = 70;
pub const SEPSIS_LACTATE_FLOOR: f64 = 1.5;

pub const DKA_POTASSIUM_FLOOR: f64 = 3.0;
pub const DKA_POTASSIUM_CEILING: f64 = 5.0;
pub const DKA_PH_CEILING: f64 = 7.35;
pub const DKA_ANION_GAP_FLOOR: i32 = 10;
pub const DKA_GLUCOSE_FLOOR: i32 = 150;

// ---------------------------------------------------------------------------
// Sepsis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SepsisState {
    /// Seconds of simulated time.
    pub time_elapsed: u32,
    /// Crystalloid given so far, mL.
    pub fluid_given: u32,
    pub antibiotics_given: bool,
    /// mmol/L.
    pub lactate: f64,
    /// Mean arterial pressure, mmHg.
    pub map: i32,
    /// mL.
    pub urine_output: u32,
    pub vasopressor_used: bool,
}

impl SepsisState {
    /// Snapshot every sepsis session starts from and `reset` returns to.
    pub fn initial() -> Self {
        Self {
            time_elapsed: 0,
            fluid_given: 0,
            antibiotics_given: false,
            lactate: 4.2,
            map: 55,
            urine_output: 0,
            vasopressor_used: false,
        }
    }

    /// Clamps to physiologic bounds and rounds to recorded precision.
    pub fn normalize(&mut self) {
        self.map = self.map.min(SEPSIS_MAP_CEILING);
        self.lactate = round_to(self.lactate.max(SEPSIS_LACTATE_FLOOR), 1);
    }
}

impl Default for SepsisState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Partial update for [`SepsisState`]. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SepsisPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_elapsed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_given: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antibiotics_given: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lactate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urine_output: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vasopressor_used: Option<bool>,
}

impl SepsisPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, state: &mut SepsisState) {
        if let Some(v) = self.time_elapsed {
            state.time_elapsed = v;
        }
        if let Some(v) = self.fluid_given {
            state.fluid_given = v;
        }
        if let Some(v) = self.antibiotics_given {
            state.antibiotics_given = v;
        }
        if let Some(v) = self.lactate {
            state.lactate = v;
        }
        if let Some(v) = self.map {
            state.map = v;
        }
        if let Some(v) = self.urine_output {
            state.urine_output = v;
        }
        if let Some(v) = self.vasopressor_used {
            state.vasopressor_used = v;
        }
    }
}

// ---------------------------------------------------------------------------
// DKA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkaState {
    /// Minutes of simulated time.
    pub time_elapsed: u32,
    /// mL.
    pub fluid_given: u32,
    /// units/kg/h.
    pub insulin_rate: f64,
    /// mg/dL.
    pub glucose: i32,
    /// mEq/L.
    pub potassium: f64,
    pub ph: f64,
    pub anion_gap: i32,
    #[serde(rename = "transitionedToSQ")]
    pub transitioned_to_sq: bool,
}

impl DkaState {
    pub fn initial() -> Self {
        Self {
            time_elapsed: 0,
            fluid_given: 0,
            insulin_rate: 0.0,
            glucose: 450,
            potassium: 3.8,
            ph: 7.15,
            anion_gap: 28,
            transitioned_to_sq: false,
        }
    }

    /// Clamps to physiologic bounds and rounds to recorded precision.
    pub fn normalize(&mut self) {
        self.potassium = round_to(
            self.potassium.clamp(DKA_POTASSIUM_FLOOR, DKA_POTASSIUM_CEILING),
            1,
        );
        self.ph = round_to(self.ph.min(DKA_PH_CEILING), 2);
        self.anion_gap = self.anion_gap.max(DKA_ANION_GAP_FLOOR);
        self.glucose = self.glucose.max(DKA_GLUCOSE_FLOOR);
        self.insulin_rate = self.insulin_rate.max(0.0);
    }

    pub fn insulin_running(&self) -> bool {
        self.insulin_rate > 0.0
    }
}

impl Default for DkaState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Partial update for [`DkaState`]. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DkaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_elapsed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_given: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulin_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anion_gap: Option<i32>,
    #[serde(
        default,
        rename = "transitionedToSQ",
        skip_serializing_if = "Option::is_none"
    )]
    pub transitioned_to_sq: Option<bool>,
}

impl DkaPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, state: &mut DkaState) {
        if let Some(v) = self.time_elapsed {
            state.time_elapsed = v;
        }
        if let Some(v) = self.fluid_given {
            state.fluid_given = v;
        }
        if let Some(v) = self.insulin_rate {
            state.insulin_rate = v;
        }
        if let Some(v) = self.glucose {
            state.glucose = v;
        }
        if let Some(v) = self.potassium {
            state.potassium = v;
        }
        if let Some(v) = self.ph {
            state.ph = v;
        }
        if let Some(v) = self.anion_gap {
            state.anion_gap = v;
        }
        if let Some(v) = self.transitioned_to_sq {
            state.transitioned_to_sq = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds half away from zero to the nearest integer.
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_int(value: f64) -> i32 {
    value.round() as i32
}

/// `h:mm` rendering of an elapsed counter, as shown on the simulator panels.
pub fn format_elapsed(time_elapsed: u32) -> String {
    format!("{}:{:02}", time_elapsed / 60, time_elapsed % 60)
}
