use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::model::{
    Question, QuestionId, Subject, SubjectDelta, SubjectId, SubjectStatistics, User, UserDelta,
    UserId, UserQuizStats,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── NEW-ROW RECORDS ───────────────────────────────────────────────────────────
//

/// Insert shape for a subject whose id the store assigns.
#[derive(Debug, Clone)]
pub struct NewSubjectRecord {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewSubjectRecord {
    /// Captures a validated subject, dropping its placeholder id.
    #[must_use]
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            name: subject.name().to_owned(),
            description: subject.description().map(str::to_owned),
            created_at: subject.created_at(),
        }
    }
}

/// Insert shape for a question whose id the store assigns.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub subject_id: SubjectId,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub fun_fact: Option<String>,
}

impl NewQuestionRecord {
    /// Captures a validated question, dropping its placeholder id.
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            subject_id: question.subject_id(),
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
            correct_option: question.correct_option(),
            fun_fact: question.fun_fact().map(str::to_owned),
        }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for subjects.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Insert a subject and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn insert_new_subject(&self, record: NewSubjectRecord)
    -> Result<SubjectId, StorageError>;

    /// Persist or update a subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Fetch a subject by id; `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StorageError>;

    /// List subjects ordered by id, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_subjects(&self, limit: u32) -> Result<Vec<Subject>, StorageError>;

    /// Delete a subject together with its questions and statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError>;
}

/// Repository contract for the question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_new_question(
        &self,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError>;

    /// Persist or update a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch a question by id; `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// All questions of a subject in insertion order (ascending id).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn questions_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError>;

    /// Delete a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// Number of questions in a subject's bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn count_for_subject(&self, subject_id: SubjectId) -> Result<u32, StorageError>;
}

/// Repository contract for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist or update a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user by id; `Ok(None)` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// List users ordered by username, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError>;

    /// Delete a user together with their aggregate stats row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user does not exist.
    async fn delete_user(&self, id: UserId) -> Result<(), StorageError>;
}

/// Repository contract for the aggregate quiz counters.
///
/// Deltas are applied as increments; each call represents one real quiz
/// attempt and is applied exactly as given, with no deduplication here.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Apply a subject delta, creating the counter row on first use.
    /// `user_id` of `None` accumulates into the guest bucket.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the counters cannot be updated.
    async fn apply_subject_delta(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
        delta: &SubjectDelta,
    ) -> Result<(), StorageError>;

    /// Apply a user delta, creating the counter row on first use. The
    /// username is denormalized into the row for ranking views.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the counters cannot be updated.
    async fn apply_user_delta(
        &self,
        user_id: UserId,
        username: &str,
        delta: &UserDelta,
    ) -> Result<(), StorageError>;

    /// Fetch one counter row; `Ok(None)` when no quiz has touched it yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_subject_statistics(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
    ) -> Result<Option<SubjectStatistics>, StorageError>;

    /// All subject counter rows, most recent attempt first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_subject_statistics(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectStatistics>, StorageError>;

    /// Fetch one user's aggregate stats; `Ok(None)` before their first quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn get_user_stats(&self, user_id: UserId)
    -> Result<Option<UserQuizStats>, StorageError>;

    /// All user aggregate rows, most quizzes first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failure.
    async fn list_user_stats(&self, limit: u32) -> Result<Vec<UserQuizStats>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subjects: Arc<Mutex<HashMap<SubjectId, Subject>>>,
    questions: Arc<Mutex<HashMap<QuestionId, Question>>>,
    users: Arc<Mutex<HashMap<UserId, User>>>,
    subject_stats: Arc<Mutex<HashMap<(SubjectId, Option<UserId>), SubjectStatistics>>>,
    user_stats: Arc<Mutex<HashMap<UserId, UserQuizStats>>>,
    next_subject_id: Arc<AtomicU64>,
    next_question_id: Arc<AtomicU64>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subjects: Arc::new(Mutex::new(HashMap::new())),
            questions: Arc::new(Mutex::new(HashMap::new())),
            users: Arc::new(Mutex::new(HashMap::new())),
            subject_stats: Arc::new(Mutex::new(HashMap::new())),
            user_stats: Arc::new(Mutex::new(HashMap::new())),
            next_subject_id: Arc::new(AtomicU64::new(1)),
            next_question_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn lock<'a, T>(
        mutex: &'a Mutex<T>,
    ) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
        mutex
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn insert_new_subject(
        &self,
        record: NewSubjectRecord,
    ) -> Result<SubjectId, StorageError> {
        let id = SubjectId::new(self.next_subject_id.fetch_add(1, Ordering::SeqCst));
        let subject = Subject::new(id, record.name, record.description, record.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Self::lock(&self.subjects)?.insert(id, subject);
        Ok(id)
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        Self::lock(&self.subjects)?.insert(subject.id(), subject.clone());
        Ok(())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        Ok(Self::lock(&self.subjects)?.get(&id).cloned())
    }

    async fn list_subjects(&self, limit: u32) -> Result<Vec<Subject>, StorageError> {
        let mut subjects: Vec<Subject> = Self::lock(&self.subjects)?.values().cloned().collect();
        subjects.sort_by_key(Subject::id);
        subjects.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(subjects)
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), StorageError> {
        if Self::lock(&self.subjects)?.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        // cascade, matching the SQLite foreign keys
        Self::lock(&self.questions)?.retain(|_, q| q.subject_id() != id);
        Self::lock(&self.subject_stats)?.retain(|(subject, _), _| *subject != id);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_new_question(
        &self,
        record: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let id = QuestionId::new(self.next_question_id.fetch_add(1, Ordering::SeqCst));
        let question = Question::new(
            id,
            record.subject_id,
            record.prompt,
            record.options,
            record.correct_option,
            record.fun_fact,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Self::lock(&self.questions)?.insert(id, question);
        Ok(id)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        Self::lock(&self.questions)?.insert(question.id(), question.clone());
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        Ok(Self::lock(&self.questions)?.get(&id).cloned())
    }

    async fn questions_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<Vec<Question>, StorageError> {
        let mut questions: Vec<Question> = Self::lock(&self.questions)?
            .values()
            .filter(|q| q.subject_id() == subject_id)
            .cloned()
            .collect();
        questions.sort_by_key(Question::id);
        Ok(questions)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        if Self::lock(&self.questions)?.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn count_for_subject(&self, subject_id: SubjectId) -> Result<u32, StorageError> {
        let count = Self::lock(&self.questions)?
            .values()
            .filter(|q| q.subject_id() == subject_id)
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("question count".into()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        Self::lock(&self.users)?.insert(user.id(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(Self::lock(&self.users)?.get(&id).cloned())
    }

    async fn list_users(&self, limit: u32) -> Result<Vec<User>, StorageError> {
        let mut users: Vec<User> = Self::lock(&self.users)?.values().cloned().collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));
        users.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StorageError> {
        if Self::lock(&self.users)?.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        Self::lock(&self.user_stats)?.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn apply_subject_delta(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
        delta: &SubjectDelta,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.subject_stats)?;
        guard
            .entry((subject_id, user_id))
            .or_insert_with(|| SubjectStatistics::empty(subject_id, user_id))
            .apply(delta);
        Ok(())
    }

    async fn apply_user_delta(
        &self,
        user_id: UserId,
        username: &str,
        delta: &UserDelta,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.user_stats)?;
        guard
            .entry(user_id)
            .or_insert_with(|| UserQuizStats::empty(user_id, username))
            .apply(delta);
        Ok(())
    }

    async fn get_subject_statistics(
        &self,
        subject_id: SubjectId,
        user_id: Option<UserId>,
    ) -> Result<Option<SubjectStatistics>, StorageError> {
        Ok(Self::lock(&self.subject_stats)?
            .get(&(subject_id, user_id))
            .cloned())
    }

    async fn list_subject_statistics(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectStatistics>, StorageError> {
        let mut rows: Vec<SubjectStatistics> =
            Self::lock(&self.subject_stats)?.values().cloned().collect();
        rows.sort_by(|a, b| b.last_attempt_at().cmp(&a.last_attempt_at()));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn get_user_stats(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserQuizStats>, StorageError> {
        Ok(Self::lock(&self.user_stats)?.get(&user_id).cloned())
    }

    async fn list_user_stats(&self, limit: u32) -> Result<Vec<UserQuizStats>, StorageError> {
        let mut rows: Vec<UserQuizStats> =
            Self::lock(&self.user_stats)?.values().cloned().collect();
        rows.sort_by(|a, b| b.total_quizzes().cmp(&a.total_quizzes()));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub statistics: Arc<dyn StatisticsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            subjects: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            statistics: Arc::new(repo),
        }
    }
}
