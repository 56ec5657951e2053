//! Append-only coaching log.
//!
//! A message's level is read off the markers embedded in its text; nothing
//! beyond the string is stored.

use serde::{Serialize, Serializer};

pub const SUCCESS_MARKER: &str = "✓";
pub const WARNING_MARKER: &str = "⚠";
pub const ERROR_MARKER: &str = "❌";
pub const DANGER_WORD: &str = "DANGER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry(String);

impl FeedbackEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    /// Danger wins over warning: "⚠ DANGER: ..." is a danger entry.
    pub fn level(&self) -> FeedbackLevel {
        let text = self.0.as_str();
        if text.contains(ERROR_MARKER) || text.contains(DANGER_WORD) {
            FeedbackLevel::Danger
        } else if text.contains(WARNING_MARKER) {
            FeedbackLevel::Warning
        } else if text.contains(SUCCESS_MARKER) {
            FeedbackLevel::Success
        } else {
            FeedbackLevel::Info
        }
    }
}

impl std::fmt::Display for FeedbackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FeedbackEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("FeedbackEntry", 2)?;
        s.serialize_field("message", &self.0)?;
        s.serialize_field("level", &self.level())?;
        s.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FeedbackLog {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = FeedbackEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&FeedbackEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn count_at(&self, level: FeedbackLevel) -> usize {
        self.entries.iter().filter(|e| e.level() == level).count()
    }
}
