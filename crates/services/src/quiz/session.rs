use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::engine::{EngineError, EnginePhase, QuizEngine, QuizProgress};
use quiz_core::model::{Question, SubjectId, UserId};
use quiz_core::recorder::RecordedDeltas;

/// One running quiz attempt: the engine plus the identity it runs under.
///
/// The session owns its engine exclusively; all mutation goes through
/// `&mut self`, so submit/advance calls are serialized by construction.
pub struct QuizSession {
    subject_id: SubjectId,
    user_id: Option<UserId>,
    username: Option<String>,
    engine: QuizEngine,
    started_at: DateTime<Utc>,
    recorded: Option<RecordedDeltas>,
}

impl QuizSession {
    pub(crate) fn new(
        subject_id: SubjectId,
        user_id: Option<UserId>,
        username: Option<String>,
        engine: QuizEngine,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id,
            user_id,
            username,
            engine,
            started_at,
            recorded: None,
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The deltas persisted for this session, once it completed and the
    /// outcome was recorded.
    #[must_use]
    pub fn recorded_deltas(&self) -> Option<&RecordedDeltas> {
        self.recorded.as_ref()
    }

    // ── Engine delegation ──

    /// The question currently displayed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoQuestionAvailable` once the session is
    /// complete.
    pub fn current_question(&self) -> Result<&Question, EngineError> {
        self.engine.current_question()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.engine.progress()
    }

    #[must_use]
    pub fn phase(&self) -> EnginePhase {
        self.engine.phase()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.engine.remaining_count()
    }

    #[must_use]
    pub fn first_attempt_correct(&self) -> u32 {
        self.engine.first_attempt_correct()
    }

    pub(crate) fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    pub(crate) fn engine_mut(&mut self) -> &mut QuizEngine {
        &mut self.engine
    }

    pub(crate) fn set_recorded(&mut self, deltas: RecordedDeltas) {
        self.recorded = Some(deltas);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("subject_id", &self.subject_id)
            .field("user_id", &self.user_id)
            .field("phase", &self.engine.phase())
            .field("remaining", &self.engine.remaining_count())
            .field("started_at", &self.started_at)
            .field("recorded", &self.recorded.is_some())
            .finish_non_exhaustive()
    }
}
