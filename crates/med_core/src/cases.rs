//! Case viewer: pick a synthetic case, work it up, reveal the diagnosis.
//! The first reveal of a selection counts the case as completed.

use crate::content::{ClinicalCase, ContentLibrary};
use crate::progress::ProgressSink;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    #[error("unknown case '{0}'")]
    UnknownCase(String),
    #[error("no case selected")]
    NothingSelected,
}

#[derive(Debug, Clone, Default)]
pub struct CaseViewer {
    selected: Option<String>,
    diagnosis_revealed: bool,
}

impl CaseViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<'c>(
        &mut self,
        library: &'c ContentLibrary,
        case_id: &str,
    ) -> Result<&'c ClinicalCase, CaseError> {
        let case = library
            .case(case_id)
            .ok_or_else(|| CaseError::UnknownCase(case_id.to_string()))?;
        self.selected = Some(case.id.clone());
        self.diagnosis_revealed = false;
        Ok(case)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn diagnosis_revealed(&self) -> bool {
        self.diagnosis_revealed
    }

    /// Returns the selected case id. Reports completion only on the first
    /// reveal for the current selection.
    pub fn reveal_diagnosis(&mut self, sink: &mut impl ProgressSink) -> Result<&str, CaseError> {
        let Some(case_id) = self.selected.as_deref() else {
            return Err(CaseError::NothingSelected);
        };
        if !self.diagnosis_revealed {
            sink.complete_case(case_id);
            self.diagnosis_revealed = true;
        }
        Ok(case_id)
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.diagnosis_revealed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progress;

    #[test]
    fn reveal_without_selection_fails() {
        let mut viewer = CaseViewer::new();
        let mut progress = Progress::default();
        assert_eq!(
            viewer.reveal_diagnosis(&mut progress).unwrap_err(),
            CaseError::NothingSelected
        );
        assert!(progress.completed_cases.is_empty());
    }

    #[test]
    fn unknown_case_rejected() {
        let mut viewer = CaseViewer::new();
        let library = ContentLibrary::default();
        assert!(matches!(
            viewer.select(&library, "case_missing"),
            Err(CaseError::UnknownCase(_))
        ));
        assert!(viewer.selected().is_none());
    }
}
