use thiserror::Error;

use crate::model::ids::{QuestionId, SubjectId};

/// Every question carries exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question must have exactly {OPTION_COUNT} options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct option index must be in [0, {OPTION_COUNT}), got {provided}")]
    CorrectOptionOutOfRange { provided: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question belonging to a subject.
///
/// Holds the prompt, a fixed set of [`OPTION_COUNT`] answer options, the
/// index of the correct option, and an optional fun-fact shown after a
/// wrong answer. Immutable once loaded into a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    subject_id: SubjectId,
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_option: usize,
    fun_fact: Option<String>,
}

impl Question {
    /// Creates a new validated question.
    ///
    /// Prompt and options are trimmed; the fun-fact is trimmed and an
    /// empty fun-fact collapses to `None`.
    ///
    /// # Errors
    ///
    /// - `QuestionError::EmptyPrompt` if the prompt is empty or whitespace
    /// - `QuestionError::WrongOptionCount` unless exactly [`OPTION_COUNT`] options are given
    /// - `QuestionError::EmptyOption` if any option is empty or whitespace
    /// - `QuestionError::CorrectOptionOutOfRange` if the key is not in `[0, OPTION_COUNT)`
    pub fn new(
        id: QuestionId,
        subject_id: SubjectId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
        fun_fact: Option<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        if options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount { len: options.len() });
        }
        let mut trimmed = Vec::with_capacity(OPTION_COUNT);
        for (index, option) in options.into_iter().enumerate() {
            let option = option.trim().to_owned();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            trimmed.push(option);
        }

        if correct_option >= OPTION_COUNT {
            return Err(QuestionError::CorrectOptionOutOfRange {
                provided: correct_option,
            });
        }

        let options: [String; OPTION_COUNT] = trimmed
            .try_into()
            .map_err(|v: Vec<String>| QuestionError::WrongOptionCount { len: v.len() })?;

        let fun_fact = fun_fact
            .map(|f| f.trim().to_owned())
            .filter(|f| !f.is_empty());

        Ok(Self {
            id,
            subject_id,
            prompt: prompt.trim().to_owned(),
            options,
            correct_option,
            fun_fact,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The ordered answer options, always [`OPTION_COUNT`] of them.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// A single option by index, `None` when out of range.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn fun_fact(&self) -> Option<&str> {
        self.fun_fact.as_deref()
    }

    /// Whether the selected option index matches the answer key.
    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_option
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
