//! Static reference content: question bank, synthetic cases, toxidromes,
//! common poisonings and disease summaries.
//!
//! Loaded once and never mutated. Loading and validation live in
//! `med_content`; this module only defines the records and lookups.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sepsis,
    Endocrine,
    Autoimmune,
    Infectious,
    Toxicology,
    Dermatologic,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sepsis => "sepsis",
            Self::Endocrine => "endocrine",
            Self::Autoimmune => "autoimmune",
            Self::Infectious => "infectious",
            Self::Toxicology => "toxicology",
            Self::Dermatologic => "dermatologic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[default]
    Mcq,
    Matching,
    Pattern,
    DragDrop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub rationale: String,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn offers(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub temperature: f64,
    pub heart_rate: u32,
    pub blood_pressure: String,
    pub respiratory_rate: u32,
    pub oxygen_saturation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mental_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub chief_complaint: String,
    pub vitals: VitalSigns,
    pub symptoms: Vec<String>,
    pub physical_exam: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub normal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalCase {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub presentation: Presentation,
    #[serde(default)]
    pub labs: Vec<LabResult>,
    pub diagnosis: String,
    pub learning_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toxidrome {
    pub name: String,
    pub signs: Vec<String>,
    pub treatment: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antidote: Option<String>,
    pub labs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poisoning {
    pub toxin: String,
    pub presentation: String,
    pub diagnosis: String,
    pub treatment: String,
    pub monitoring: Vec<String>,
    pub red_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentStep {
    pub order: u32,
    pub action: String,
    pub rationale: String,
    pub monitoring: Vec<String>,
    pub pitfalls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub pathophysiology: String,
    pub diagnostic_features: Vec<String>,
    pub systemic_manifestations: Vec<String>,
    pub initial_management: Vec<String>,
    pub labs: Vec<String>,
    pub red_flags: Vec<String>,
    pub complications: Vec<String>,
    #[serde(default)]
    pub treatment_sequence: Vec<TreatmentStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLibrary {
    pub content_version: String,
    pub questions: Vec<Question>,
    pub cases: Vec<ClinicalCase>,
    pub toxidromes: Vec<Toxidrome>,
    pub poisonings: Vec<Poisoning>,
    pub diseases: Vec<Disease>,
}

impl ContentLibrary {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn questions_in(&self, category: Category) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    pub fn case(&self, id: &str) -> Option<&ClinicalCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn cases_in(&self, category: Category) -> Vec<&ClinicalCase> {
        self.cases.iter().filter(|c| c.category == category).collect()
    }

    /// Case-insensitive match on the toxidrome name.
    pub fn toxidrome(&self, name: &str) -> Option<&Toxidrome> {
        self.toxidromes
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn disease(&self, id: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == id)
    }

    pub fn diseases_in(&self, category: Category) -> Vec<&Disease> {
        self.diseases
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }
}
