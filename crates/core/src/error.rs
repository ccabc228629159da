use thiserror::Error;

use crate::engine::EngineError;
use crate::model::{OutcomeError, QuestionError, SubjectError, UserError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}
