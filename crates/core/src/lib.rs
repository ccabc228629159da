#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod recorder;
pub mod time;

pub use engine::{EngineError, EnginePhase, QuizEngine, QuizProgress};
pub use error::Error;
pub use recorder::{OutcomeRecorder, RecordedDeltas};
pub use time::Clock;
