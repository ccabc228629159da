mod ids;
mod outcome;
mod question;
mod stats;
mod subject;
mod user;

pub use ids::{ParseIdError, QuestionId, SubjectId, UserId};
pub use outcome::{AnswerEvent, OutcomeError, QuestionResult, QuizOutcome};
pub use question::{OPTION_COUNT, Question, QuestionError};
pub use stats::{SubjectDelta, SubjectStatistics, UserDelta, UserQuizStats};
pub use subject::{Subject, SubjectError};
pub use user::{User, UserError, UserRole};
