use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::model::{
    AnswerEvent, OPTION_COUNT, OutcomeError, Question, QuestionId, QuestionResult, QuizOutcome,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("{operation} is not allowed in the {phase} phase")]
    InvalidState {
        operation: &'static str,
        phase: EnginePhase,
    },

    #[error("selected option index must be in [0, {OPTION_COUNT}), got {provided}")]
    InvalidSelection { provided: usize },

    #[error("duplicate question id in session input: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("no question available: the session is complete")]
    NoQuestionAvailable,

    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a session stands between two calls.
///
/// Construction performs the initial seeding, so a freshly built engine is
/// already awaiting a selection (or complete, for an empty question list).
/// `submit_answer` moves `AwaitingSelection` to `AnswerRevealed`; `advance`
/// moves back, or to `Complete` once the pending queue drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    AwaitingSelection,
    AnswerRevealed,
    Complete,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnginePhase::AwaitingSelection => "awaiting-selection",
            EnginePhase::AnswerRevealed => "answer-revealed",
            EnginePhase::Complete => "complete",
        };
        write!(f, "{label}")
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub mastered: usize,
    pub total: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Retry-until-mastered scheduler for one quiz session.
///
/// Questions are presented from a pending queue seeded in input order. A
/// correct answer removes the current question from the queue; a wrong
/// answer recycles it to the back, so a missed question only reappears
/// after every other still-pending question has been seen once. The
/// session completes when the queue is empty, at which point every
/// question has been answered correctly at least once.
///
/// Callers alternate [`QuizEngine::submit_answer`] and
/// [`QuizEngine::advance`] per question; calling either out of turn is
/// rejected with [`EngineError::InvalidState`] and leaves the session
/// untouched. All transitions are synchronous and clock-free; any
/// reveal-then-continue pacing belongs to the caller.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    original: Vec<Question>,
    pending: Vec<Question>,
    cursor: usize,
    mastered: HashSet<QuestionId>,
    first_attempt: HashMap<QuestionId, bool>,
    first_attempt_correct: u32,
    last_answer: Option<AnswerEvent>,
    phase: EnginePhase,
}

impl QuizEngine {
    /// Starts a session over the given questions, preserving their order.
    ///
    /// An empty list yields an already-complete session with an empty
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DuplicateQuestionId` if two questions share
    /// an id; ids must be unique within one session.
    pub fn new(questions: Vec<Question>) -> Result<Self, EngineError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(EngineError::DuplicateQuestionId(question.id()));
            }
        }

        let mut engine = Self {
            original: questions,
            pending: Vec::new(),
            cursor: 0,
            mastered: HashSet::new(),
            first_attempt: HashMap::new(),
            first_attempt_correct: 0,
            last_answer: None,
            phase: EnginePhase::Complete,
        };
        engine.reset();
        Ok(engine)
    }

    /// Reinitializes every field for a statistically independent rerun of
    /// the same question list. No mastery, first-attempt, or answer
    /// history carries over.
    pub fn reset(&mut self) {
        self.pending = self.original.clone();
        self.cursor = 0;
        self.mastered = HashSet::with_capacity(self.original.len());
        self.first_attempt = HashMap::with_capacity(self.original.len());
        self.first_attempt_correct = 0;
        self.last_answer = None;
        self.phase = if self.pending.is_empty() {
            EnginePhase::Complete
        } else {
            EnginePhase::AwaitingSelection
        };
    }

    // ── Queries ──

    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == EnginePhase::Complete
    }

    /// The question currently displayed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoQuestionAvailable` once the session is
    /// complete.
    pub fn current_question(&self) -> Result<&Question, EngineError> {
        if self.is_complete() {
            return Err(EngineError::NoQuestionAvailable);
        }
        self.pending
            .get(self.cursor)
            .ok_or(EngineError::NoQuestionAvailable)
    }

    /// Progress snapshot, derivable in every phase.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            mastered: self.mastered.len(),
            total: self.original.len(),
            remaining: self.pending.len(),
            is_complete: self.is_complete(),
        }
    }

    /// Questions still pending, retries included.
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.original.len()
    }

    /// Questions answered correctly on their first presentation so far.
    #[must_use]
    pub fn first_attempt_correct(&self) -> u32 {
        self.first_attempt_correct
    }

    // ── Transitions ──

    /// Submits an answer for the current question and reveals the result.
    ///
    /// The first submission per question id feeds the first-attempt
    /// counter; retries never do. The engine is left unchanged on any
    /// rejected call.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidState` outside the
    /// `AwaitingSelection` phase and `EngineError::InvalidSelection` for
    /// an out-of-range option index.
    pub fn submit_answer(&mut self, selected: usize) -> Result<AnswerEvent, EngineError> {
        if self.phase != EnginePhase::AwaitingSelection {
            return Err(EngineError::InvalidState {
                operation: "submit_answer",
                phase: self.phase,
            });
        }
        if selected >= OPTION_COUNT {
            return Err(EngineError::InvalidSelection { provided: selected });
        }

        let question = self
            .pending
            .get(self.cursor)
            .ok_or(EngineError::NoQuestionAvailable)?;
        let event = AnswerEvent::new(question.id(), selected, question.is_correct(selected));

        if !self.first_attempt.contains_key(&event.question_id) {
            self.first_attempt.insert(event.question_id, event.is_correct);
            if event.is_correct {
                self.first_attempt_correct += 1;
            }
        }

        self.last_answer = Some(event);
        self.phase = EnginePhase::AnswerRevealed;
        Ok(event)
    }

    /// Moves past the revealed answer to the next question, or to
    /// `Complete` when the last pending question was answered correctly.
    ///
    /// Correct: the current question leaves the queue for the mastered
    /// set, and the cursor wraps to the front if it fell off the end.
    /// Wrong: the current question is recycled to the back of the queue;
    /// the item that shifted into the cursor slot is shown next, except
    /// when the miss happened at the tail, where the cursor wraps to the
    /// front so the missed question is not immediately re-shown.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidState` outside the `AnswerRevealed`
    /// phase.
    pub fn advance(&mut self) -> Result<EnginePhase, EngineError> {
        if self.phase != EnginePhase::AnswerRevealed {
            return Err(EngineError::InvalidState {
                operation: "advance",
                phase: self.phase,
            });
        }
        let Some(event) = self.last_answer.take() else {
            return Err(EngineError::InvalidState {
                operation: "advance",
                phase: self.phase,
            });
        };
        if self.cursor >= self.pending.len() {
            return Err(EngineError::NoQuestionAvailable);
        }

        let question = self.pending.remove(self.cursor);

        if event.is_correct {
            self.mastered.insert(question.id());
            if self.pending.is_empty() {
                self.phase = EnginePhase::Complete;
                return Ok(self.phase);
            }
            if self.cursor >= self.pending.len() {
                self.cursor = 0;
            }
        } else {
            if self.cursor >= self.pending.len() {
                self.cursor = 0;
            }
            self.pending.push(question);
        }

        self.phase = EnginePhase::AwaitingSelection;
        Ok(self.phase)
    }

    /// The terminal outcome, with one result per original question in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidState` unless the session is complete.
    pub fn outcome(&self) -> Result<QuizOutcome, EngineError> {
        if !self.is_complete() {
            return Err(EngineError::InvalidState {
                operation: "outcome",
                phase: self.phase,
            });
        }

        let results = self
            .original
            .iter()
            .map(|question| QuestionResult {
                question_id: question.id(),
                first_attempt_correct: self
                    .first_attempt
                    .get(&question.id())
                    .copied()
                    .unwrap_or(false),
            })
            .collect();

        Ok(QuizOutcome::from_results(results)?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
