//! Assessment runner over a fixed, ordered question list.
//!
//! Per question the runner is either `Answering` (a pending answer may be
//! chosen and changed) or `Submitted` (answer locked, rationale visible).

use crate::content::Question;
use crate::progress::ProgressSink;
use serde::Serialize;
use thiserror::Error;

pub const CORRECT_SCORE: u32 = 100;
pub const INCORRECT_SCORE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Answering,
    Submitted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResult {
    pub question_id: String,
    pub answer: String,
    pub correct: bool,
    pub correct_answer: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("question list is empty")]
    NoQuestions,
    #[error("answer is locked until the next question")]
    AnswerLocked,
    #[error("'{0}' is not an option for this question")]
    UnknownOption(String),
    #[error("no answer selected")]
    NoAnswerSelected,
    #[error("submit an answer before moving on")]
    NotSubmitted,
    #[error("already at the last question")]
    AtLastQuestion,
    #[error("already at the first question")]
    AtFirstQuestion,
}

#[derive(Debug, Clone)]
pub struct QuizRunner {
    questions: Vec<Question>,
    index: usize,
    pending: Option<String>,
    phase: QuizPhase,
    score: Score,
    last_result: Option<SubmitResult>,
}

impl QuizRunner {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self {
            questions,
            index: 0,
            pending: None,
            phase: QuizPhase::Answering,
            score: Score::default(),
            last_result: None,
        })
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.index]
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`: construction rejects an empty list.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn pending_answer(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Result of the current question's submission, while it is visible.
    pub fn last_result(&self) -> Option<&SubmitResult> {
        match self.phase {
            QuizPhase::Submitted => self.last_result.as_ref(),
            QuizPhase::Answering => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.score.total as usize >= self.questions.len()
    }

    pub fn can_go_next(&self) -> bool {
        self.phase == QuizPhase::Submitted && self.index + 1 < self.questions.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.index > 0
    }

    /// Replaces any earlier pending choice for this question.
    pub fn select_answer(&mut self, option: &str) -> Result<(), QuizError> {
        if self.phase == QuizPhase::Submitted {
            return Err(QuizError::AnswerLocked);
        }
        if !self.current_question().offers(option) {
            return Err(QuizError::UnknownOption(option.to_string()));
        }
        self.pending = Some(option.to_string());
        Ok(())
    }

    /// Locks the pending answer, scores it and reports `(question id, 100|0)`.
    pub fn submit(&mut self, sink: &mut impl ProgressSink) -> Result<&SubmitResult, QuizError> {
        if self.phase == QuizPhase::Submitted {
            return Err(QuizError::AnswerLocked);
        }
        let Some(answer) = self.pending.clone() else {
            return Err(QuizError::NoAnswerSelected);
        };
        let question = &self.questions[self.index];
        let correct = question.is_correct(&answer);

        self.score.total += 1;
        if correct {
            self.score.correct += 1;
        }
        self.phase = QuizPhase::Submitted;

        let score = if correct { CORRECT_SCORE } else { INCORRECT_SCORE };
        sink.record_assessment_score(&question.id, score);

        let result = SubmitResult {
            question_id: question.id.clone(),
            answer,
            correct,
            correct_answer: question.correct_answer.clone(),
            rationale: question.rationale.clone(),
        };
        let stored: &SubmitResult = self.last_result.insert(result);
        Ok(stored)
    }

    pub fn next(&mut self) -> Result<(), QuizError> {
        if self.phase != QuizPhase::Submitted {
            return Err(QuizError::NotSubmitted);
        }
        if self.index + 1 >= self.questions.len() {
            return Err(QuizError::AtLastQuestion);
        }
        self.move_to(self.index + 1);
        Ok(())
    }

    /// Re-opens the earlier question for answering; its earlier answer is not
    /// restored.
    pub fn previous(&mut self) -> Result<(), QuizError> {
        if self.index == 0 {
            return Err(QuizError::AtFirstQuestion);
        }
        self.move_to(self.index - 1);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.move_to(0);
        self.score = Score::default();
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.pending = None;
        self.phase = QuizPhase::Answering;
        self.last_result = None;
    }
}
