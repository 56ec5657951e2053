//! Learner progress: completed cases, per-question scores, finished modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Insertion ordered. Completing a case twice records it twice.
    pub completed_cases: Vec<String>,
    /// question id -> score (0 or 100). Last write wins.
    pub assessment_scores: BTreeMap<String, u32>,
    pub modules_completed: Vec<String>,
    pub last_accessed: DateTime<Utc>,
}

impl Progress {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            completed_cases: Vec::new(),
            assessment_scores: BTreeMap::new(),
            modules_completed: Vec::new(),
            last_accessed: now,
        }
    }

    pub fn complete_case_at(&mut self, case_id: &str, now: DateTime<Utc>) {
        self.completed_cases.push(case_id.to_string());
        self.last_accessed = now;
    }

    pub fn record_score_at(&mut self, question_id: &str, score: u32, now: DateTime<Utc>) {
        self.assessment_scores.insert(question_id.to_string(), score);
        self.last_accessed = now;
    }

    pub fn complete_module_at(&mut self, module_id: &str, now: DateTime<Utc>) {
        self.modules_completed.push(module_id.to_string());
        self.last_accessed = now;
    }

    pub fn has_completed_case(&self, case_id: &str) -> bool {
        self.completed_cases.iter().any(|c| c == case_id)
    }

    pub fn score_for(&self, question_id: &str) -> Option<u32> {
        self.assessment_scores.get(question_id).copied()
    }

    /// Mean of recorded question scores; `None` before any answer.
    pub fn average_score(&self) -> Option<f64> {
        if self.assessment_scores.is_empty() {
            return None;
        }
        let sum: u32 = self.assessment_scores.values().sum();
        Some(f64::from(sum) / self.assessment_scores.len() as f64)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// Where the quiz runner and case viewer report learner activity.
pub trait ProgressSink {
    fn record_assessment_score(&mut self, question_id: &str, score: u32);
    fn complete_case(&mut self, case_id: &str);
}

impl ProgressSink for Progress {
    fn record_assessment_score(&mut self, question_id: &str, score: u32) {
        self.record_score_at(question_id, score, Utc::now());
    }

    fn complete_case(&mut self, case_id: &str) {
        self.complete_case_at(case_id, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn duplicate_case_completions_are_kept() {
        let mut progress = Progress::new(at(0));
        progress.complete_case_at("case_sepsis_1", at(10));
        progress.complete_case_at("case_sepsis_1", at(20));
        assert_eq!(progress.completed_cases.len(), 2);
        assert_eq!(progress.last_accessed, at(20));
    }

    #[test]
    fn score_last_write_wins() {
        let mut progress = Progress::new(at(0));
        progress.record_score_at("q1_sepsis", 0, at(1));
        progress.record_score_at("q1_sepsis", 100, at(2));
        assert_eq!(progress.score_for("q1_sepsis"), Some(100));
        assert_eq!(progress.assessment_scores.len(), 1);
    }

    #[test]
    fn average_over_recorded_questions() {
        let mut progress = Progress::new(at(0));
        assert!(progress.average_score().is_none());
        progress.record_score_at("q1_sepsis", 100, at(1));
        progress.record_score_at("q2_dka", 0, at(2));
        let avg = progress.average_score().unwrap();
        assert!((avg - 50.0).abs() < 1e-9);
    }

    #[test]
    fn modules_append_in_order() {
        let mut progress = Progress::new(at(0));
        progress.complete_module_at("sepsis", at(1));
        progress.complete_module_at("dka-hhs", at(2));
        assert_eq!(progress.modules_completed, vec!["sepsis", "dka-hhs"]);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let progress = Progress::new(at(0));
        let json = serde_json::to_value(&progress).unwrap();
        assert!(json.get("completedCases").is_some());
        assert!(json.get("lastAccessed").is_some());
    }
}
