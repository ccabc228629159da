use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{Subject, SubjectId};
use storage::repository::{NewSubjectRecord, SubjectRepository};

use crate::error::SubjectServiceError;

/// Orchestrates subject creation and persistence.
#[derive(Clone)]
pub struct SubjectService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    #[must_use]
    pub fn new(clock: Clock, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { clock, subjects }
    }

    /// Create a new subject and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` for validation failures.
    /// Returns `SubjectServiceError::Storage` if persistence fails.
    pub async fn create_subject(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<SubjectId, SubjectServiceError> {
        let now = self.clock.now();
        let subject = Subject::new(SubjectId::new(1), name, description, now)?;
        let subject_id = self
            .subjects
            .insert_new_subject(NewSubjectRecord::from_subject(&subject))
            .await?;
        tracing::debug!(subject = %subject_id, "subject created");
        Ok(subject_id)
    }

    /// List subjects ordered by ID, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn list_subjects(&self, limit: u32) -> Result<Vec<Subject>, SubjectServiceError> {
        let subjects = self.subjects.list_subjects(limit).await?;
        Ok(subjects)
    }

    /// Fetch a subject by ID.
    ///
    /// Returns `Ok(None)` when the subject does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn get_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<Option<Subject>, SubjectServiceError> {
        let subject = self.subjects.get_subject(subject_id).await?;
        Ok(subject)
    }

    /// Rename a subject while preserving its description and metadata.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` if validation fails.
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn rename_subject(
        &self,
        subject_id: SubjectId,
        name: String,
    ) -> Result<(), SubjectServiceError> {
        let subject = self
            .subjects
            .get_subject(subject_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        self.update_subject(subject_id, name, subject.description().map(str::to_owned))
            .await
    }

    /// Update subject name and description.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Subject` if validation fails.
    /// Returns `SubjectServiceError::Storage` if repository access fails.
    pub async fn update_subject(
        &self,
        subject_id: SubjectId,
        name: String,
        description: Option<String>,
    ) -> Result<(), SubjectServiceError> {
        let subject = self
            .subjects
            .get_subject(subject_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let updated = Subject::new(subject.id(), name, description, subject.created_at())?;
        self.subjects.upsert_subject(&updated).await?;
        Ok(())
    }

    /// Delete a subject together with its question bank and statistics.
    ///
    /// # Errors
    ///
    /// Returns `SubjectServiceError::Storage` if the subject does not
    /// exist or repository access fails.
    pub async fn delete_subject(&self, subject_id: SubjectId) -> Result<(), SubjectServiceError> {
        self.subjects.delete_subject(subject_id).await?;
        tracing::debug!(subject = %subject_id, "subject deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn get_subject_returns_persisted_subject() {
        let repo = InMemoryRepository::new();
        let subject = Subject::new(SubjectId::new(1), "Test", None, fixed_now()).unwrap();
        repo.upsert_subject(&subject).await.unwrap();

        let service = SubjectService::new(fixed_clock(), std::sync::Arc::new(repo));
        let fetched = service.get_subject(subject.id()).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name(), "Test");
    }

    #[tokio::test]
    async fn create_and_rename_subject() {
        let repo = InMemoryRepository::new();
        let service = SubjectService::new(fixed_clock(), std::sync::Arc::new(repo));

        let subject_id = service
            .create_subject("Astronomy".to_string(), Some("planets".into()))
            .await
            .unwrap();

        service
            .rename_subject(subject_id, "Astrophysics".to_string())
            .await
            .unwrap();

        let refreshed = service.get_subject(subject_id).await.unwrap().unwrap();
        assert_eq!(refreshed.name(), "Astrophysics");
        // rename keeps the description
        assert_eq!(refreshed.description(), Some("planets"));
    }

    #[tokio::test]
    async fn create_subject_rejects_blank_name() {
        let repo = InMemoryRepository::new();
        let service = SubjectService::new(fixed_clock(), std::sync::Arc::new(repo));

        let err = service
            .create_subject("   ".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubjectServiceError::Subject(_)));
    }

    #[tokio::test]
    async fn delete_missing_subject_is_not_found() {
        let repo = InMemoryRepository::new();
        let service = SubjectService::new(fixed_clock(), std::sync::Arc::new(repo));

        let err = service.delete_subject(SubjectId::new(5)).await.unwrap_err();
        assert!(matches!(
            err,
            SubjectServiceError::Storage(storage::repository::StorageError::NotFound)
        ));
    }
}
