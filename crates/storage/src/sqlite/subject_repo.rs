use quiz_core::model::{Subject, SubjectId};

use super::{
    SqliteRepository,
    mapping::{id_i64, map_subject_row, ser},
};
use crate::repository::{NewSubjectRecord, StorageError, SubjectRepository};

#[async_trait::async_trait]
impl SubjectRepository for SqliteRepository {
    async fn insert_new_subject(
        &self,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO subjects (name, description, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(record.name)
        .bind(record.description)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = u64::try_from(res.last_insert_rowid()).map_err(ser)?;
        Ok(SubjectId::new(id))
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO subjects (id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                -- keep created_at from the original insert; only update mutable fields
                name = excluded.name,
                description = excluded.description
            ",
        )
        .bind(id_i64("subject_id", subject.id().value())?)
        .bind(subject.name().to_owned())
        .bind(subject.description().map(str::to_owned))
        .bind(subject.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM subjects
            WHERE id = ?1
            ",
        )
        .bind(id_i64("subject_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_subject_row).transpose()
    }

    async fn list_subjects(&self, limit: u32) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, created_at
            FROM subjects
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut subjects = Vec::with_capacity(rows.len());
        for row in rows {
            subjects.push(map_subject_row(&row)?);
        }
        Ok(subjects)
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM subjects WHERE id = ?1")
            .bind(id_i64("subject_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
