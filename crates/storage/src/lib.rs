#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, NewQuestionRecord, NewSubjectRecord, QuestionRepository,
    StatisticsRepository, Storage, StorageError, SubjectRepository, UserRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
