pub mod models;
pub mod postgres;

pub use models::{MockInterview, UserAnswerRow};
pub use postgres::DatabaseManager;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Mock interview not found: {0}")]
    InterviewNotFound(String),
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
