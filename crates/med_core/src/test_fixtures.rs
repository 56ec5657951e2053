//! Shared test fixtures for med_core and downstream crates.
//!
//! `sample_library()` is a small self-contained content library: two
//! questions and one case. `run_ticks()` drives a started simulator through a
//! [`ManualScheduler`] without waiting on the wall clock.

use crate::{
    AppStore, Category, ClinicalCase, ContentLibrary, Difficulty, ManualScheduler,
    MemoryStorage, PhysiologyModel, Presentation, Question, QuestionKind, Simulator, VitalSigns,
};

pub const SEPSIS_QUESTION_ID: &str = "q1_sepsis";
pub const SEPSIS_CORRECT: &str = "Start norepinephrine to target MAP ≥65";
pub const SEPSIS_WRONG: &str = "Give another 2L fluid bolus";
pub const DKA_QUESTION_ID: &str = "q2_dka";
pub const DKA_CORRECT: &str = "Give potassium and recheck level before insulin";
pub const SAMPLE_CASE_ID: &str = "case_sepsis_1";

pub fn sepsis_question() -> Question {
    Question {
        id: SEPSIS_QUESTION_ID.to_string(),
        kind: QuestionKind::Mcq,
        category: Category::Sepsis,
        difficulty: Difficulty::Intermediate,
        prompt: "MAP 63 after 2L crystalloid. What is the next best step?".to_string(),
        options: vec![
            SEPSIS_WRONG.to_string(),
            SEPSIS_CORRECT.to_string(),
            "Order a CT scan to find source".to_string(),
            "Wait and reassess in 1 hour".to_string(),
        ],
        correct_answer: SEPSIS_CORRECT.to_string(),
        rationale: "Vasopressors once MAP stays below 65 after adequate fluids.".to_string(),
    }
}

pub fn dka_question() -> Question {
    Question {
        id: DKA_QUESTION_ID.to_string(),
        kind: QuestionKind::Mcq,
        category: Category::Endocrine,
        difficulty: Difficulty::Intermediate,
        prompt: "K+ 3.1 mEq/L. What must happen before insulin?".to_string(),
        options: vec![
            "Start insulin immediately - DKA is an emergency".to_string(),
            DKA_CORRECT.to_string(),
        ],
        correct_answer: DKA_CORRECT.to_string(),
        rationale: "Never start insulin when K+ <3.3 mEq/L.".to_string(),
    }
}

pub fn sample_case() -> ClinicalCase {
    ClinicalCase {
        id: SAMPLE_CASE_ID.to_string(),
        title: "Septic Shock in the ED".to_string(),
        category: Category::Sepsis,
        difficulty: Difficulty::Intermediate,
        presentation: Presentation {
            chief_complaint: "Fever and confusion for 2 days".to_string(),
            vitals: VitalSigns {
                temperature: 38.9,
                heart_rate: 125,
                blood_pressure: "85/50".to_string(),
                respiratory_rate: 28,
                oxygen_saturation: 92,
                mental_status: None,
            },
            symptoms: vec!["Decreased urine output".to_string()],
            physical_exam: vec!["Crackles in right lower lung".to_string()],
        },
        labs: vec![],
        diagnosis: "Septic shock secondary to community-acquired pneumonia".to_string(),
        learning_points: vec!["Antibiotics within 1 hour improves survival".to_string()],
    }
}

pub fn sample_library() -> ContentLibrary {
    ContentLibrary {
        content_version: "test".to_string(),
        questions: vec![sepsis_question(), dka_question()],
        cases: vec![sample_case()],
        ..ContentLibrary::default()
    }
}

/// Store backed by a shared in-memory blob, plus a handle to that blob.
pub fn memory_store() -> (AppStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = AppStore::open(Box::new(storage.clone()));
    (store, storage)
}

/// Starts the clock if needed and delivers `n` ticks. Returns ticks delivered.
pub fn run_ticks<M: PhysiologyModel>(sim: &mut Simulator<M>, store: &mut AppStore, n: u64) -> u64 {
    sim.start();
    let mut scheduler = ManualScheduler::new();
    scheduler.advance(n);
    sim.pump(store, &mut scheduler)
}
