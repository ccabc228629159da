use std::sync::Arc;

use quiz_core::model::{Question, QuestionId, SubjectId};
use storage::repository::{NewQuestionRecord, QuestionRepository, SubjectRepository};

use crate::error::QuestionServiceError;

/// Orchestrates question-bank management for administrators.
#[derive(Clone)]
pub struct QuestionService {
    subjects: Arc<dyn SubjectRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(
        subjects: Arc<dyn SubjectRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            subjects,
            questions,
        }
    }

    /// Create a new question in a subject's bank and persist it.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::SubjectNotFound` for an unknown
    /// subject, `QuestionServiceError::Question` for validation failures,
    /// and `QuestionServiceError::Storage` if persistence fails.
    pub async fn create_question(
        &self,
        subject_id: SubjectId,
        prompt: String,
        options: Vec<String>,
        correct_option: usize,
        fun_fact: Option<String>,
    ) -> Result<QuestionId, QuestionServiceError> {
        if self.subjects.get_subject(subject_id).await?.is_none() {
            return Err(QuestionServiceError::SubjectNotFound(subject_id));
        }

        let question = Question::new(
            QuestionId::new(1),
            subject_id,
            prompt,
            options,
            correct_option,
            fun_fact,
        )?;
        let question_id = self
            .questions
            .insert_new_question(NewQuestionRecord::from_question(&question))
            .await?;
        tracing::debug!(subject = %subject_id, question = %question_id, "question created");
        Ok(question_id)
    }

    /// Replace a question's content, keeping its id and subject.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` if validation fails.
    /// Returns `QuestionServiceError::Storage` if the question does not
    /// exist or repository access fails.
    pub async fn update_question(
        &self,
        question_id: QuestionId,
        prompt: String,
        options: Vec<String>,
        correct_option: usize,
        fun_fact: Option<String>,
    ) -> Result<(), QuestionServiceError> {
        let existing = self
            .questions
            .get_question(question_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let updated = Question::new(
            existing.id(),
            existing.subject_id(),
            prompt,
            options,
            correct_option,
            fun_fact,
        )?;
        self.questions.upsert_question(&updated).await?;
        Ok(())
    }

    /// Fetch a question by ID.
    ///
    /// Returns `Ok(None)` when the question does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn get_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Option<Question>, QuestionServiceError> {
        let question = self.questions.get_question(question_id).await?;
        Ok(question)
    }

    /// A subject's question bank in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn questions_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, QuestionServiceError> {
        let questions = self.questions.questions_for_subject(subject_id).await?;
        Ok(questions)
    }

    /// Number of questions in a subject's bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn question_count(
        &self,
        subject_id: SubjectId,
    ) -> Result<u32, QuestionServiceError> {
        let count = self.questions.count_for_subject(subject_id).await?;
        Ok(count)
    }

    /// Delete a question from its subject's bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if the question does not
    /// exist or repository access fails.
    pub async fn delete_question(
        &self,
        question_id: QuestionId,
    ) -> Result<(), QuestionServiceError> {
        self.questions.delete_question(question_id).await?;
        tracing::debug!(question = %question_id, "question deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::Subject;
    use quiz_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewSubjectRecord};

    fn options() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into(), "d".into()]
    }

    async fn seeded_subject(repo: &InMemoryRepository) -> SubjectId {
        let subject = Subject::new(SubjectId::new(1), "Seeded", None, fixed_now()).unwrap();
        repo.insert_new_subject(NewSubjectRecord::from_subject(&subject))
            .await
            .unwrap()
    }

    fn service(repo: &InMemoryRepository) -> QuestionService {
        QuestionService::new(Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn create_question_rejects_unknown_subject() {
        let repo = InMemoryRepository::new();
        let err = service(&repo)
            .create_question(SubjectId::new(7), "Q".into(), options(), 0, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuestionServiceError::SubjectNotFound(id) if id == SubjectId::new(7)
        ));
    }

    #[tokio::test]
    async fn create_list_and_count_questions() {
        let repo = InMemoryRepository::new();
        let subject_id = seeded_subject(&repo).await;
        let svc = service(&repo);

        svc.create_question(subject_id, "First".into(), options(), 0, None)
            .await
            .unwrap();
        svc.create_question(subject_id, "Second".into(), options(), 3, Some("fact".into()))
            .await
            .unwrap();

        let listed = svc.questions_for_subject(subject_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].prompt(), "First");
        assert_eq!(listed[1].fun_fact(), Some("fact"));
        assert_eq!(svc.question_count(subject_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_question_keeps_id_and_subject() {
        let repo = InMemoryRepository::new();
        let subject_id = seeded_subject(&repo).await;
        let svc = service(&repo);

        let question_id = svc
            .create_question(subject_id, "Before".into(), options(), 0, None)
            .await
            .unwrap();
        svc.update_question(question_id, "After".into(), options(), 2, None)
            .await
            .unwrap();

        let fetched = svc.get_question(question_id).await.unwrap().unwrap();
        assert_eq!(fetched.prompt(), "After");
        assert_eq!(fetched.correct_option(), 2);
        assert_eq!(fetched.subject_id(), subject_id);
    }

    #[tokio::test]
    async fn create_question_rejects_bad_option_count() {
        let repo = InMemoryRepository::new();
        let subject_id = seeded_subject(&repo).await;

        let err = service(&repo)
            .create_question(subject_id, "Q".into(), vec!["only".into()], 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, QuestionServiceError::Question(_)));
    }

    #[tokio::test]
    async fn delete_question_removes_it_from_the_bank() {
        let repo = InMemoryRepository::new();
        let subject_id = seeded_subject(&repo).await;
        let svc = service(&repo);

        let question_id = svc
            .create_question(subject_id, "Q".into(), options(), 0, None)
            .await
            .unwrap();
        svc.delete_question(question_id).await.unwrap();

        assert!(svc.get_question(question_id).await.unwrap().is_none());
        assert_eq!(svc.question_count(subject_id).await.unwrap(), 0);
    }
}
