use quiz_core::model::{OPTION_COUNT, Question, QuestionId, SubjectId};

use super::{
    SqliteRepository,
    mapping::{id_i64, map_question_row, ser, u32_from_i64},
};
use crate::repository::{NewQuestionRecord, QuestionRepository, StorageError};

fn option_at(options: &[String], index: usize) -> Result<String, StorageError> {
    options
        .get(index)
        .cloned()
        .ok_or_else(|| StorageError::Serialization(format!("missing option {index}")))
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_new_question(
        &self,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        if record.options.len() != OPTION_COUNT {
            return Err(StorageError::Serialization(format!(
                "expected {OPTION_COUNT} options, got {}",
                record.options.len()
            )));
        }

        let res = sqlx::query(
            r"
            INSERT INTO questions (
                subject_id, prompt, option_a, option_b, option_c, option_d,
                correct_option, fun_fact
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(id_i64("subject_id", record.subject_id.value())?)
        .bind(record.prompt)
        .bind(option_at(&record.options, 0)?)
        .bind(option_at(&record.options, 1)?)
        .bind(option_at(&record.options, 2)?)
        .bind(option_at(&record.options, 3)?)
        .bind(i64::try_from(record.correct_option).map_err(ser)?)
        .bind(record.fun_fact)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = u64::try_from(res.last_insert_rowid()).map_err(ser)?;
        Ok(QuestionId::new(id))
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO questions (
                id, subject_id, prompt, option_a, option_b, option_c, option_d,
                correct_option, fun_fact
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                subject_id = excluded.subject_id,
                prompt = excluded.prompt,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_option = excluded.correct_option,
                fun_fact = excluded.fun_fact
            ",
        )
        .bind(id_i64("question_id", question.id().value())?)
        .bind(id_i64("subject_id", question.subject_id().value())?)
        .bind(question.prompt().to_owned())
        .bind(option_at(question.options(), 0)?)
        .bind(option_at(question.options(), 1)?)
        .bind(option_at(question.options(), 2)?)
        .bind(option_at(question.options(), 3)?)
        .bind(i64::try_from(question.correct_option()).map_err(ser)?)
        .bind(question.fun_fact().map(str::to_owned))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                id, subject_id, prompt, option_a, option_b, option_c, option_d,
                correct_option, fun_fact
            FROM questions
            WHERE id = ?1
            ",
        )
        .bind(id_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn questions_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, subject_id, prompt, option_a, option_b, option_c, option_d,
                correct_option, fun_fact
            FROM questions
            WHERE subject_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_i64("subject_id", subject_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(id_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn count_for_subject(&self, subject_id: SubjectId) -> Result<u32, StorageError> {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM questions
            WHERE subject_id = ?1
            ",
        )
        .bind(id_i64("subject_id", subject_id.value())?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        u32_from_i64("question count", row.0)
    }
}
