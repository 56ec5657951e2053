use med_core::{
    AppStore, CaseViewer, ContentLibrary, DkaSimulator, FeedbackEntry, QuizRunner,
    SepsisSimulator,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// The single learner session the daemon hosts.
pub struct Session {
    pub store: AppStore,
    pub sepsis: SepsisSimulator,
    pub dka: DkaSimulator,
    /// `None` when the content set has no questions.
    pub quiz: Option<QuizRunner>,
    pub cases: CaseViewer,
    pub content: ContentLibrary,
}

impl Session {
    pub fn new(store: AppStore, content: ContentLibrary) -> Self {
        let quiz = QuizRunner::new(content.questions.clone()).ok();
        Self {
            store,
            sepsis: SepsisSimulator::new(),
            dka: DkaSimulator::new(),
            quiz,
            cases: CaseViewer::new(),
            content,
        }
    }

    pub fn dispose(&mut self) {
        self.sepsis.dispose();
        self.dka.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.sepsis.clock_state() == med_core::ClockState::Disposed
            && self.dka.clock_state() == med_core::ClockState::Disposed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCause {
    Tick,
    Action,
    Patch,
    Reset,
}

/// A change to one simulator, as pushed to stream subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct SimUpdate {
    pub simulator: &'static str,
    pub cause: UpdateCause,
    pub time_elapsed: u32,
    pub running: bool,
    pub state: serde_json::Value,
    /// Entries added by this change only.
    pub feedback: Vec<FeedbackEntry>,
}

pub type SharedSession = Arc<Mutex<Session>>;
pub type UpdateTx = broadcast::Sender<SimUpdate>;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub update_tx: UpdateTx,
    pub ticks_per_sec: f64,
}

impl AppState {
    pub fn new(session: Session, ticks_per_sec: f64) -> Self {
        let (update_tx, _) = broadcast::channel(256);
        Self {
            session: Arc::new(Mutex::new(session)),
            update_tx,
            ticks_per_sec,
        }
    }
}
