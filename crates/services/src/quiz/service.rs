use std::sync::Arc;

use rand::seq::SliceRandom;

use quiz_core::Clock;
use quiz_core::engine::{EnginePhase, QuizEngine};
use quiz_core::model::{AnswerEvent, SubjectId, UserId};
use quiz_core::recorder::{OutcomeRecorder, RecordedDeltas};
use storage::repository::{
    QuestionRepository, StatisticsRepository, SubjectRepository, UserRepository,
};

use super::session::QuizSession;
use crate::error::QuizError;

/// Result of moving past a revealed answer.
#[derive(Debug, Clone)]
pub struct QuizAdvance {
    pub phase: EnginePhase,
    pub is_complete: bool,
    /// Deltas persisted on the transition into `Complete`; `None` on every
    /// other advance.
    pub recorded: Option<RecordedDeltas>,
}

/// Orchestrates quiz session start, answering, and outcome persistence.
///
/// Question loading happens once at session start; the engine then runs
/// entirely in memory, and the aggregate counters are written exactly once
/// when the session completes.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
    questions: Arc<dyn QuestionRepository>,
    users: Arc<dyn UserRepository>,
    statistics: Arc<dyn StatisticsRepository>,
    shuffle_questions: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        subjects: Arc<dyn SubjectRepository>,
        questions: Arc<dyn QuestionRepository>,
        users: Arc<dyn UserRepository>,
        statistics: Arc<dyn StatisticsRepository>,
    ) -> Self {
        Self {
            clock,
            subjects,
            questions,
            users,
            statistics,
            shuffle_questions: false,
        }
    }

    /// Shuffle the question order at session start instead of presenting
    /// the bank in insertion order.
    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle_questions: bool) -> Self {
        self.shuffle_questions = shuffle_questions;
        self
    }

    /// Start a new quiz session over a subject's question bank.
    ///
    /// Pass `None` for `user_id` to run a guest session; guest outcomes
    /// still count toward the subject's statistics.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SubjectNotFound` / `QuizError::UserNotFound`
    /// for unknown ids, `QuizError::Engine` for invalid question banks,
    /// and `QuizError::Storage` for repository failures.
    pub async fn start_quiz(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
    ) -> Result<QuizSession, QuizError> {
        if self.subjects.get_subject(subject_id).await?.is_none() {
            return Err(QuizError::SubjectNotFound(subject_id));
        }

        let username = match user_id {
            Some(id) => Some(
                self.users
                    .get_user(id)
                    .await?
                    .ok_or(QuizError::UserNotFound(id))?
                    .username()
                    .to_owned(),
            ),
            None => None,
        };

        let mut questions = self.questions.questions_for_subject(subject_id).await?;
        if self.shuffle_questions {
            questions.shuffle(&mut rand::rng());
        }

        let engine = QuizEngine::new(questions)?;
        let started_at = self.clock.now();
        tracing::debug!(
            subject = %subject_id,
            questions = engine.total_questions(),
            guest = user_id.is_none(),
            "quiz session started"
        );

        Ok(QuizSession::new(
            subject_id,
            user_id,
            username,
            engine,
            started_at,
        ))
    }

    /// Submit an answer for the currently displayed question.
    ///
    /// # Errors
    ///
    /// Propagates `QuizError::Engine` for out-of-turn calls or an
    /// out-of-range option index.
    pub fn submit_answer(
        &self,
        session: &mut QuizSession,
        selected: usize,
    ) -> Result<AnswerEvent, QuizError> {
        let event = session.engine_mut().submit_answer(selected)?;
        tracing::debug!(
            question = %event.question_id,
            correct = event.is_correct,
            "answer submitted"
        );
        Ok(event)
    }

    /// Move past the revealed answer. On the transition into `Complete`,
    /// derive the outcome deltas and persist them.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` for out-of-turn calls and
    /// `QuizError::Storage` if persisting the final deltas fails; in the
    /// latter case the session stays complete and
    /// [`QuizLoopService::record_outcome`] can retry persistence.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizAdvance, QuizError> {
        let phase = session.engine_mut().advance()?;

        let mut recorded = None;
        if session.is_complete() && session.recorded_deltas().is_none() {
            recorded = Some(self.record_outcome(session).await?);
        }

        Ok(QuizAdvance {
            phase,
            is_complete: session.is_complete(),
            recorded,
        })
    }

    /// Persist the terminal outcome's counter deltas, at most once per
    /// session.
    ///
    /// Returns the already-applied deltas on repeat calls, so this doubles
    /// as the retry hook when the final persistence failed mid-`advance`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotComplete` before the session finished and
    /// `QuizError::Storage` if the counters cannot be updated.
    pub async fn record_outcome(
        &self,
        session: &mut QuizSession,
    ) -> Result<RecordedDeltas, QuizError> {
        if let Some(deltas) = session.recorded_deltas() {
            return Ok(deltas.clone());
        }
        if !session.is_complete() {
            return Err(QuizError::NotComplete);
        }

        let outcome = session.engine().outcome()?;
        let recorded_at = self.clock.now();
        let deltas = OutcomeRecorder::new().record(&outcome, session.user_id(), recorded_at);

        self.statistics
            .apply_subject_delta(session.subject_id(), session.user_id(), &deltas.subject_delta)
            .await?;
        if let (Some(user_id), Some(user_delta)) = (session.user_id(), &deltas.user_delta) {
            let username = session.username().unwrap_or_default().to_owned();
            self.statistics
                .apply_user_delta(user_id, &username, user_delta)
                .await?;
        }

        session.set_recorded(deltas.clone());
        tracing::info!(
            subject = %session.subject_id(),
            first_attempt_correct = outcome.first_attempt_correct(),
            total = outcome.total_questions(),
            "quiz outcome recorded"
        );
        Ok(deltas)
    }
}
