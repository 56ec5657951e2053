//! Explicitly owned application store and its persisted snapshot.
//!
//! The store is the single writer of progress and simulator state. Every
//! mutation rewrites the snapshot through the injected [`BlobStorage`].

use crate::progress::{Progress, ProgressSink};
use crate::types::{DkaPatch, DkaState, SepsisPatch, SepsisState};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

/// Name the snapshot blob is stored under.
pub const SNAPSHOT_NAME: &str = "multisystem-master-storage";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Opaque single-blob persistence.
pub trait BlobStorage: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> std::io::Result<Option<String>>;
    fn save(&mut self, blob: &str) -> std::io::Result<()>;
}

/// In-memory blob. Clones share the same cell, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.blob.lock() = Some(blob.into());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl BlobStorage for MemoryStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        Ok(self.blob.lock().clone())
    }

    fn save(&mut self, blob: &str) -> std::io::Result<()> {
        *self.blob.lock() = Some(blob.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub dark_mode: bool,
    pub user_progress: Progress,
    pub sepsis_simulator: SepsisState,
    pub dka_simulator: DkaState,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            dark_mode: true,
            user_progress: Progress::default(),
            sepsis_simulator: SepsisState::initial(),
            dka_simulator: DkaState::initial(),
        }
    }
}

impl Snapshot {
    /// Decodes a stored blob. Each top-level field that is missing or fails to
    /// decode falls back to its initial value on its own; a blob that is not
    /// JSON at all yields the initial snapshot.
    pub fn from_json_lenient(blob: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(blob) else {
            tracing::warn!("persisted snapshot is not valid JSON, using initial state");
            return Self::default();
        };
        let fallback = Self::default();
        let mut snapshot = Self {
            dark_mode: field(&value, "darkMode").unwrap_or(fallback.dark_mode),
            user_progress: field(&value, "userProgress").unwrap_or(fallback.user_progress),
            sepsis_simulator: field(&value, "sepsisSimulator")
                .unwrap_or(fallback.sepsis_simulator),
            dka_simulator: field(&value, "dkaSimulator").unwrap_or(fallback.dka_simulator),
        };
        // Hand-edited blobs can hold out-of-range values.
        snapshot.sepsis_simulator.normalize();
        snapshot.dka_simulator.normalize();
        snapshot
    }
}

fn field<T: DeserializeOwned>(value: &serde_json::Value, key: &str) -> Option<T> {
    let raw = value.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::warn!(field = key, "snapshot field unreadable, using initial value: {err}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// AppStore
// ---------------------------------------------------------------------------

pub struct AppStore {
    snapshot: Snapshot,
    storage: Option<Box<dyn BlobStorage>>,
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("snapshot", &self.snapshot)
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AppStore {
    /// Store with no backing storage.
    pub fn in_memory() -> Self {
        Self {
            snapshot: Snapshot::default(),
            storage: None,
        }
    }

    /// Loads the snapshot from `storage`, falling back to the initial snapshot
    /// when the blob is missing or unreadable. Never fails.
    pub fn open(storage: Box<dyn BlobStorage>) -> Self {
        let snapshot = match storage.load() {
            Ok(Some(blob)) => Snapshot::from_json_lenient(&blob),
            Ok(None) => Snapshot::default(),
            Err(err) => {
                tracing::warn!("failed to read persisted snapshot, using initial state: {err}");
                Snapshot::default()
            }
        };
        Self {
            snapshot,
            storage: Some(storage),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot)
    }

    fn persist(&mut self) {
        let Some(storage) = self.storage.as_mut() else {
            return;
        };
        match serde_json::to_string(&self.snapshot) {
            Ok(blob) => {
                if let Err(err) = storage.save(&blob) {
                    tracing::warn!("failed to persist snapshot: {err}");
                }
            }
            Err(err) => tracing::warn!("snapshot serialization failed: {err}"),
        }
    }

    // --- theme ---------------------------------------------------------

    pub fn dark_mode(&self) -> bool {
        self.snapshot.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) {
        self.snapshot.dark_mode = !self.snapshot.dark_mode;
        self.persist();
    }

    // --- progress ------------------------------------------------------

    pub fn progress(&self) -> &Progress {
        &self.snapshot.user_progress
    }

    pub fn complete_module(&mut self, module_id: &str) {
        self.snapshot
            .user_progress
            .complete_module_at(module_id, Utc::now());
        self.persist();
    }

    // --- simulators ----------------------------------------------------

    pub fn sepsis(&self) -> &SepsisState {
        &self.snapshot.sepsis_simulator
    }

    /// Merges `patch` into the sepsis record, then normalizes it.
    ///
    /// `time_elapsed` never moves backwards through a merge; only
    /// [`reset_sepsis`](Self::reset_sepsis) rewinds the clock.
    pub fn update_sepsis(&mut self, patch: &SepsisPatch) {
        let state = &mut self.snapshot.sepsis_simulator;
        let elapsed = state.time_elapsed;
        patch.apply_to(state);
        state.time_elapsed = state.time_elapsed.max(elapsed);
        state.normalize();
        self.persist();
    }

    pub fn reset_sepsis(&mut self) {
        self.snapshot.sepsis_simulator = SepsisState::initial();
        self.persist();
    }

    pub fn dka(&self) -> &DkaState {
        &self.snapshot.dka_simulator
    }

    /// Same merge rule as [`update_sepsis`](Self::update_sepsis).
    pub fn update_dka(&mut self, patch: &DkaPatch) {
        let state = &mut self.snapshot.dka_simulator;
        let elapsed = state.time_elapsed;
        patch.apply_to(state);
        state.time_elapsed = state.time_elapsed.max(elapsed);
        state.normalize();
        self.persist();
    }

    pub fn reset_dka(&mut self) {
        self.snapshot.dka_simulator = DkaState::initial();
        self.persist();
    }
}

impl ProgressSink for AppStore {
    fn record_assessment_score(&mut self, question_id: &str, score: u32) {
        self.snapshot
            .user_progress
            .record_score_at(question_id, score, Utc::now());
        self.persist();
    }

    fn complete_case(&mut self, case_id: &str) {
        self.snapshot
            .user_progress
            .complete_case_at(case_id, Utc::now());
        self.persist();
    }
}
