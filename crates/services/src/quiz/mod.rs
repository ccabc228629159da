mod service;
mod session;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use service::{QuizAdvance, QuizLoopService};
pub use session::QuizSession;
