use std::sync::Arc;

use log::{info, warn};

use crate::ai::{self, normalize, prompts, AiError, Shape, TextGenerator};

use super::questions::{QuestionCategory, QuestionRecord};

/// Builds generation prompts, runs one service round trip, and coerces the
/// response into an ordered question set.
///
/// Generation failures are surfaced to the caller: an interview cannot start
/// without questions, so there is no fallback here (unlike evaluation).
pub struct QuestionSetGenerator {
    client: Arc<dyn TextGenerator>,
}

impl QuestionSetGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    pub async fn generate(
        &self,
        job_position: &str,
        job_description: &str,
        years_experience: u32,
        question_count: usize,
    ) -> ai::Result<Vec<QuestionRecord>> {
        info!(
            "Generating {} interview questions for {} position ({} years experience)",
            question_count, job_position, years_experience
        );

        let prompt = prompts::question_set_prompt(
            job_position,
            job_description,
            years_experience,
            question_count,
        );
        let raw = self.send(&prompt).await?;

        let value = normalize(&raw, Shape::Array)?;
        let items = value
            .as_array()
            .ok_or_else(|| AiError::Validation("expected a JSON array of questions".to_string()))?;

        if items.len() != question_count {
            warn!(
                "Service returned {} questions, requested {}",
                items.len(),
                question_count
            );
        }

        let questions: Vec<QuestionRecord> = items
            .iter()
            .enumerate()
            .map(|(index, item)| QuestionRecord::from_loose(item, index))
            .collect();

        info!("Generated question set with {} questions", questions.len());
        Ok(questions)
    }

    /// Generate one question of a given category, e.g. to replace a question
    /// the candidate wants to regenerate.
    pub async fn generate_one(
        &self,
        job_position: &str,
        job_description: &str,
        years_experience: u32,
        category: QuestionCategory,
    ) -> ai::Result<QuestionRecord> {
        let prompt = prompts::single_question_prompt(
            job_position,
            job_description,
            years_experience,
            category,
        );
        let raw = self.send(&prompt).await?;

        let value = normalize(&raw, Shape::Object)?;
        if !value.is_object() {
            return Err(AiError::Validation(
                "expected a single JSON question object".to_string(),
            ));
        }

        Ok(QuestionRecord::from_loose(&value, 0))
    }

    async fn send(&self, prompt: &str) -> ai::Result<String> {
        let raw = self.client.send_prompt(prompt).await?;
        if raw.trim().is_empty() {
            return Err(AiError::Generation(
                "text generation service returned empty output".to_string(),
            ));
        }
        Ok(raw)
    }
}
