use std::sync::Arc;

use quiz_core::Clock;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::question_service::QuestionService;
use crate::quiz::QuizLoopService;
use crate::stats_service::StatsService;
use crate::subject_service::SubjectService;
use crate::user_service::UserService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    subject_service: Arc<SubjectService>,
    question_service: Arc<QuestionService>,
    user_service: Arc<UserService>,
    stats_service: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over the in-memory backend, for tests and demos.
    #[must_use]
    pub fn new_in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    /// Wire services over an already-connected storage aggregate.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.users),
            Arc::clone(&storage.statistics),
        ));
        let subject_service = Arc::new(SubjectService::new(clock, Arc::clone(&storage.subjects)));
        let question_service = Arc::new(QuestionService::new(
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.questions),
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&storage.users)));
        let stats_service = Arc::new(StatsService::new(
            Arc::clone(&storage.subjects),
            Arc::clone(&storage.statistics),
        ));

        Self {
            quiz_loop,
            subject_service,
            question_service,
            user_service,
            stats_service,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn subject_service(&self) -> Arc<SubjectService> {
        Arc::clone(&self.subject_service)
    }

    #[must_use]
    pub fn question_service(&self) -> Arc<QuestionService> {
        Arc::clone(&self.question_service)
    }

    #[must_use]
    pub fn user_service(&self) -> Arc<UserService> {
        Arc::clone(&self.user_service)
    }

    #[must_use]
    pub fn stats_service(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats_service)
    }
}
