//! Time-series history backing the simulator line charts.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub tick: u32,
    pub values: BTreeMap<String, f64>,
}

impl ChartPoint {
    pub fn new(tick: u32, values: &[(&str, f64)]) -> Self {
        Self {
            tick,
            values: values
                .iter()
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChartHistory {
    points: Vec<ChartPoint>,
}

impl ChartHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points arrive in tick order; the clock guarantees it.
    pub fn push(&mut self, point: ChartPoint) {
        debug_assert!(
            self.points.last().is_none_or(|last| last.tick <= point.tick),
            "chart points must be appended in tick order"
        );
        self.points.push(point);
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// `(tick, value)` pairs for one variable, skipping points that lack it.
    pub fn series(&self, name: &str) -> Vec<(u32, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.value(name).map(|v| (p.tick, v)))
            .collect()
    }

    /// Sorted union of variable names across all points.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .points
            .iter()
            .flat_map(|p| p.values.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
