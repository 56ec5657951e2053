//! `med_core`: clinical training state, physiology ticks and assessments.
//!
//! No IO beyond the injected [`BlobStorage`]. Time only advances through a
//! [`Scheduler`].

mod cases;
mod chart;
mod clock;
mod content;
pub mod dka;
mod feedback;
mod progress;
mod quiz;
pub mod sepsis;
mod simulator;
mod store;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use cases::{CaseError, CaseViewer};
pub use chart::{ChartHistory, ChartPoint};
pub use clock::{ClockState, ManualScheduler, Scheduler, SimulationClock, WallScheduler, TICK_PERIOD};
pub use content::{
    Category, ClinicalCase, ContentLibrary, Difficulty, Disease, LabResult, Poisoning,
    Presentation, Question, QuestionKind, Toxidrome, TreatmentStep, VitalSigns,
};
pub use dka::{Dka, DkaAction, DkaPhase};
pub use feedback::{FeedbackEntry, FeedbackLevel, FeedbackLog};
pub use progress::{Progress, ProgressSink};
pub use quiz::{QuizError, QuizPhase, QuizRunner, Score, SubmitResult, CORRECT_SCORE, INCORRECT_SCORE};
pub use sepsis::{Sepsis, SepsisAction, SepsisOutcome};
pub use simulator::{PhysiologyModel, Simulator, StepOutput};
pub use store::{AppStore, BlobStorage, MemoryStorage, Snapshot, SNAPSHOT_NAME};
pub use types::*;

pub type SepsisSimulator = Simulator<Sepsis>;
pub type DkaSimulator = Simulator<Dka>;

/// Action name that no simulator recognises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct ActionParseError(pub String);

#[cfg(test)]
mod tests;
