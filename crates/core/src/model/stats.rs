use chrono::{DateTime, Utc};

use crate::model::ids::{SubjectId, UserId};

//
// ─── DELTAS ────────────────────────────────────────────────────────────────────
//

/// Increment applied to a subject's aggregate counters after one completed
/// quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectDelta {
    pub attempts_increment: u32,
    pub correct_increment: u32,
    pub wrong_increment: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Increment applied to a user's aggregate counters after one completed
/// quiz session. Omitted entirely for guest sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserDelta {
    pub quizzes_increment: u32,
    pub first_attempt_correct_increment: u32,
    pub questions_increment: u32,
    pub recorded_at: DateTime<Utc>,
}

//
// ─── SUBJECT STATISTICS ────────────────────────────────────────────────────────
//

/// Aggregate quiz counters for one subject and one user.
///
/// `user_id` of `None` is the guest bucket: anonymous sessions still
/// contribute subject-level counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectStatistics {
    subject_id: SubjectId,
    user_id: Option<UserId>,
    total_attempts: u32,
    correct_answers: u32,
    wrong_answers: u32,
    last_attempt_at: Option<DateTime<Utc>>,
}

impl SubjectStatistics {
    /// An empty counter row, ready for deltas.
    #[must_use]
    pub fn empty(subject_id: SubjectId, user_id: Option<UserId>) -> Self {
        Self {
            subject_id,
            user_id,
            total_attempts: 0,
            correct_answers: 0,
            wrong_answers: 0,
            last_attempt_at: None,
        }
    }

    /// Rehydrates a row from persisted storage.
    #[must_use]
    pub fn from_persisted(
        subject_id: SubjectId,
        user_id: Option<UserId>,
        total_attempts: u32,
        correct_answers: u32,
        wrong_answers: u32,
        last_attempt_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            subject_id,
            user_id,
            total_attempts,
            correct_answers,
            wrong_answers,
            last_attempt_at,
        }
    }

    /// Applies one session's delta to the counters.
    pub fn apply(&mut self, delta: &SubjectDelta) {
        self.total_attempts = self.total_attempts.saturating_add(delta.attempts_increment);
        self.correct_answers = self.correct_answers.saturating_add(delta.correct_increment);
        self.wrong_answers = self.wrong_answers.saturating_add(delta.wrong_increment);
        self.last_attempt_at = Some(delta.recorded_at);
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
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    #[must_use]
    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }
}

//
// ─── USER QUIZ STATS ───────────────────────────────────────────────────────────
//

/// Aggregate quiz counters for one user across all subjects.
///
/// The username is denormalized into the row so ranking views need no
/// extra join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuizStats {
    user_id: UserId,
    username: String,
    total_quizzes: u32,
    total_first_attempt_correct: u32,
    total_questions: u32,
    last_quiz_at: Option<DateTime<Utc>>,
}

impl UserQuizStats {
    /// An empty counter row, ready for deltas.
    #[must_use]
    pub fn empty(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            total_quizzes: 0,
            total_first_attempt_correct: 0,
            total_questions: 0,
            last_quiz_at: None,
        }
    }

    /// Rehydrates a row from persisted storage.
    #[must_use]
    pub fn from_persisted(
        user_id: UserId,
        username: impl Into<String>,
        total_quizzes: u32,
        total_first_attempt_correct: u32,
        total_questions: u32,
        last_quiz_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            total_quizzes,
            total_first_attempt_correct,
            total_questions,
            last_quiz_at,
        }
    }

    /// Applies one session's delta to the counters.
    pub fn apply(&mut self, delta: &UserDelta) {
        self.total_quizzes = self.total_quizzes.saturating_add(delta.quizzes_increment);
        self.total_first_attempt_correct = self
            .total_first_attempt_correct
            .saturating_add(delta.first_attempt_correct_increment);
        self.total_questions = self.total_questions.saturating_add(delta.questions_increment);
        self.last_quiz_at = Some(delta.recorded_at);
    }

    /// First-attempt accuracy as a rounded percentage, 0 when no questions
    /// have been answered yet.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let ratio = f64::from(self.total_first_attempt_correct) / f64::from(self.total_questions);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (ratio * 100.0).round() as u32
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn total_quizzes(&self) -> u32 {
        self.total_quizzes
    }

    #[must_use]
    pub fn total_first_attempt_correct(&self) -> u32 {
        self.total_first_attempt_correct
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn last_quiz_at(&self) -> Option<DateTime<Utc>> {
        self.last_quiz_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn subject_statistics_accumulates_deltas() {
        let mut stats = SubjectStatistics::empty(SubjectId::new(1), None);
        let delta = SubjectDelta {
            attempts_increment: 1,
            correct_increment: 2,
            wrong_increment: 1,
            recorded_at: fixed_now(),
        };

        stats.apply(&delta);
        stats.apply(&delta);

        assert_eq!(stats.total_attempts(), 2);
        assert_eq!(stats.correct_answers(), 4);
        assert_eq!(stats.wrong_answers(), 2);
        assert_eq!(stats.last_attempt_at(), Some(fixed_now()));
    }

    #[test]
    fn user_stats_accumulates_deltas() {
        let user = UserId::random();
        let mut stats = UserQuizStats::empty(user, "ana");
        stats.apply(&UserDelta {
            quizzes_increment: 1,
            first_attempt_correct_increment: 2,
            questions_increment: 3,
            recorded_at: fixed_now(),
        });

        assert_eq!(stats.user_id(), user);
        assert_eq!(stats.username(), "ana");
        assert_eq!(stats.total_quizzes(), 1);
        assert_eq!(stats.total_first_attempt_correct(), 2);
        assert_eq!(stats.total_questions(), 3);
        assert_eq!(stats.last_quiz_at(), Some(fixed_now()));
    }

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        let mut stats = UserQuizStats::empty(UserId::random(), "bo");
        assert_eq!(stats.accuracy_percent(), 0);

        stats.apply(&UserDelta {
            quizzes_increment: 1,
            first_attempt_correct_increment: 2,
            questions_increment: 3,
            recorded_at: fixed_now(),
        });
        // 2/3 = 66.7%
        assert_eq!(stats.accuracy_percent(), 67);
    }
}
