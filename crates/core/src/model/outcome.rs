use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutcomeError {
    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },
}

//
// ─── ANSWER EVENT ──────────────────────────────────────────────────────────────
//

/// Record of a single answer submission within a session.
///
/// Correctness is derived by comparing the selected index with the
/// question's answer key at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    pub selected_option: usize,
    pub is_correct: bool,
}

impl AnswerEvent {
    #[must_use]
    pub fn new(question_id: QuestionId, selected_option: usize, is_correct: bool) -> Self {
        Self {
            question_id,
            selected_option,
            is_correct,
        }
    }
}

//
// ─── QUESTION RESULT ───────────────────────────────────────────────────────────
//

/// Per-question record inside a terminal [`QuizOutcome`].
///
/// By the time a session completes, every question has been mastered, so
/// the interesting signal is whether it was answered correctly on its
/// very first presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub first_attempt_correct: bool,
}

//
// ─── QUIZ OUTCOME ──────────────────────────────────────────────────────────────
//

/// Terminal result of a quiz session, one record per original question in
/// input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    results: Vec<QuestionResult>,
    total_questions: u32,
    first_attempt_correct: u32,
}

impl QuizOutcome {
    /// Builds an outcome from per-question results, counting the
    /// first-attempt-correct aggregate.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeError::TooManyQuestions` if the result count cannot
    /// fit in `u32`.
    pub fn from_results(results: Vec<QuestionResult>) -> Result<Self, OutcomeError> {
        let total_questions = u32::try_from(results.len())
            .map_err(|_| OutcomeError::TooManyQuestions { len: results.len() })?;

        let mut first_attempt_correct = 0_u32;
        for result in &results {
            if result.first_attempt_correct {
                first_attempt_correct = first_attempt_correct.saturating_add(1);
            }
        }

        Ok(Self {
            results,
            total_questions,
            first_attempt_correct,
        })
    }

    #[must_use]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Questions answered correctly on their first presentation.
    #[must_use]
    pub fn first_attempt_correct(&self) -> u32 {
        self.first_attempt_correct
    }

    /// Questions that needed at least one retry.
    #[must_use]
    pub fn first_attempt_wrong(&self) -> u32 {
        self.total_questions - self.first_attempt_correct
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u64, first_attempt_correct: bool) -> QuestionResult {
        QuestionResult {
            question_id: QuestionId::new(id),
            first_attempt_correct,
        }
    }

    #[test]
    fn outcome_counts_first_attempt_results() {
        let outcome = QuizOutcome::from_results(vec![
            result(1, true),
            result(2, false),
            result(3, true),
        ])
        .unwrap();

        assert_eq!(outcome.total_questions(), 3);
        assert_eq!(outcome.first_attempt_correct(), 2);
        assert_eq!(outcome.first_attempt_wrong(), 1);
        assert_eq!(outcome.results().len(), 3);
    }

    #[test]
    fn empty_outcome_is_valid() {
        let outcome = QuizOutcome::from_results(Vec::new()).unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.total_questions(), 0);
        assert_eq!(outcome.first_attempt_correct(), 0);
    }

    #[test]
    fn outcome_preserves_input_order() {
        let outcome =
            QuizOutcome::from_results(vec![result(9, false), result(4, true), result(7, true)])
                .unwrap();
        let ids: Vec<u64> = outcome
            .results()
            .iter()
            .map(|r| r.question_id.value())
            .collect();
        assert_eq!(ids, vec![9, 4, 7]);
    }
}
