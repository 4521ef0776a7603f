//! Mockprep core: AI-driven mock interview generation, answer evaluation,
//! and session scoring.
//!
//! The text generation service, the record store, and the identity provider
//! are external collaborators consumed at their interface boundary
//! ([`ai::TextGenerator`], [`database::DatabaseManager`], and an opaque user
//! email respectively).

pub mod ai;
pub mod config;
pub mod database;
pub mod interview;

pub use ai::{AiError, GeminiClient, TextGenerator};
pub use config::AppConfig;
pub use database::{DatabaseManager, MockInterview, UserAnswerRow};
pub use interview::{
    AnswerEvaluation, AnswerEvaluator, AnswerRecord, AnswerRecorder, Difficulty, InterviewEngine,
    InterviewSession, QuestionCategory, QuestionRecord, QuestionSetGenerator, SessionError,
    SessionPhase,
};
