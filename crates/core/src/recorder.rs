use chrono::{DateTime, Utc};

use crate::model::{QuizOutcome, SubjectDelta, UserDelta, UserId};

//
// ─── RECORDED DELTAS ───────────────────────────────────────────────────────────
//

/// The two aggregate-counter increments derived from one completed quiz
/// session.
///
/// The user delta is `None` for guest sessions; the subject delta is
/// always produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDeltas {
    pub subject_delta: SubjectDelta,
    pub user_delta: Option<UserDelta>,
}

//
// ─── RECORDER ──────────────────────────────────────────────────────────────────
//

/// Turns a terminal [`QuizOutcome`] into the counter deltas that the
/// statistics collaborators persist.
///
/// First-attempt correctness is the scored signal: once every question is
/// eventually mastered by construction, it is the only metric that
/// differentiates performance, and rankings depend on it exclusively.
///
/// This is a pure computation with no I/O; applying the deltas (and
/// applying them at most once) is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeRecorder;

impl OutcomeRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Derives the subject and (for signed-in sessions) user deltas.
    ///
    /// `recorded_at` comes from the caller's clock; the recorder itself is
    /// time-free.
    #[must_use]
    pub fn record(
        &self,
        outcome: &QuizOutcome,
        user_id: Option<UserId>,
        recorded_at: DateTime<Utc>,
    ) -> RecordedDeltas {
        let subject_delta = SubjectDelta {
            attempts_increment: 1,
            correct_increment: outcome.first_attempt_correct(),
            wrong_increment: outcome.first_attempt_wrong(),
            recorded_at,
        };

        let user_delta = user_id.map(|_| UserDelta {
            quizzes_increment: 1,
            first_attempt_correct_increment: outcome.first_attempt_correct(),
            questions_increment: outcome.total_questions(),
            recorded_at,
        });

        RecordedDeltas {
            subject_delta,
            user_delta,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
