pub mod answers;
pub mod engine;
pub mod evaluator;
pub mod generator;
pub mod questions;
pub mod recorder;
pub mod session;

pub use answers::{AnswerEvaluation, AnswerRecord};
pub use engine::InterviewEngine;
pub use evaluator::AnswerEvaluator;
pub use generator::QuestionSetGenerator;
pub use questions::{Difficulty, QuestionCategory, QuestionRecord};
pub use recorder::{AnswerRecorder, RecorderState};
pub use session::{InterviewSession, QuestionStatus, SessionPhase};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Question set is empty")]
    EmptyQuestionSet,
    #[error("Question index {index} out of range (session has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
