pub mod gemini;
pub mod normalizer;
pub mod prompts;

pub use gemini::GeminiClient;
pub use normalizer::{normalize, Shape};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Text generation failed: {0}")]
    Generation(String),
    #[error("Response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("Unexpected response shape: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, AiError>;

/// One round trip to the text generation service. Implementations carry no
/// conversation state; every call stands alone.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn send_prompt(&self, prompt: &str) -> Result<String>;
}
