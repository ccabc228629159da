use quiz_core::model::{
    SubjectDelta, SubjectId, SubjectStatistics, UserDelta, UserId, UserQuizStats,
};

use super::{
    SqliteRepository,
    mapping::{id_i64, map_subject_stats_row, map_user_stats_row, user_id_to_text},
};
use crate::repository::{StatisticsRepository, StorageError};

#[async_trait::async_trait]
impl StatisticsRepository for SqliteRepository {
    async fn apply_subject_delta(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
        delta: &SubjectDelta,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO subject_statistics (
                subject_id, user_id, total_attempts, correct_answers,
                wrong_answers, last_attempt_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(subject_id, user_id) DO UPDATE SET
                total_attempts = total_attempts + excluded.total_attempts,
                correct_answers = correct_answers + excluded.correct_answers,
                wrong_answers = wrong_answers + excluded.wrong_answers,
                last_attempt_at = excluded.last_attempt_at
            ",
        )
        .bind(id_i64("subject_id", subject_id.value())?)
        .bind(user_id_to_text(user_id))
        .bind(i64::from(delta.attempts_increment))
        .bind(i64::from(delta.correct_increment))
        .bind(i64::from(delta.wrong_increment))
        .bind(delta.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn apply_user_delta(
        &self,
        user_id: UserId,
        username: &str,
        delta: &UserDelta,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_quiz_stats (
                user_id, username, total_quizzes, total_first_attempt_correct,
                total_questions, last_quiz_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                total_quizzes = total_quizzes + excluded.total_quizzes,
                total_first_attempt_correct =
                    total_first_attempt_correct + excluded.total_first_attempt_correct,
                total_questions = total_questions + excluded.total_questions,
                last_quiz_at = excluded.last_quiz_at
            ",
        )
        .bind(user_id.to_string())
        .bind(username.to_owned())
        .bind(i64::from(delta.quizzes_increment))
        .bind(i64::from(delta.first_attempt_correct_increment))
        .bind(i64::from(delta.questions_increment))
        .bind(delta.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_subject_statistics(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
    ) -> Result<Option<SubjectStatistics>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                subject_id, user_id, total_attempts, correct_answers,
                wrong_answers, last_attempt_at
            FROM subject_statistics
            WHERE subject_id = ?1 AND user_id = ?2
            ",
        )
        .bind(id_i64("subject_id", subject_id.value())?)
        .bind(user_id_to_text(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_subject_stats_row).transpose()
    }

    async fn list_subject_statistics(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectStatistics>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                subject_id, user_id, total_attempts, correct_answers,
                wrong_answers, last_attempt_at
            FROM subject_statistics
            ORDER BY last_attempt_at DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_subject_stats_row(&row)?);
        }
        Ok(out)
    }

    async fn get_user_stats(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserQuizStats>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, username, total_quizzes, total_first_attempt_correct,
                total_questions, last_quiz_at
            FROM user_quiz_stats
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_user_stats_row).transpose()
    }

    async fn list_user_stats(&self, limit: u32) -> Result<Vec<UserQuizStats>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                user_id, username, total_quizzes, total_first_attempt_correct,
                total_questions, last_quiz_at
            FROM user_quiz_stats
            ORDER BY total_quizzes DESC, username ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_user_stats_row(&row)?);
        }
        Ok(out)
    }
}
