#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod question_service;
pub mod quiz;
pub mod stats_service;
pub mod subject_service;
pub mod user_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, QuestionServiceError, QuizError, StatsServiceError, SubjectServiceError,
    UserServiceError,
};
pub use question_service::QuestionService;
pub use quiz::{QuizAdvance, QuizLoopService, QuizSession};
pub use stats_service::{StatsService, SubjectOverview, SubjectScore, UserRanking};
pub use subject_service::SubjectService;
pub use user_service::UserService;
