use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::ai::{self, normalize, prompts, AiError, Shape, TextGenerator};

use super::questions::QuestionRecord;
use super::session::InterviewSession;
use super::AnswerEvaluation;

/// Default pause between consecutive service calls in a batch evaluation
/// pass. Calls are strictly sequential; the pause respects the service's
/// implicit rate contract.
const DEFAULT_PACE: Duration = Duration::from_secs(1);

/// Scores one answer against its question via the text generation service.
///
/// Evaluation is best-effort: malformed ratings are clamped, missing fields
/// defaulted, and a total inference failure yields a flagged fallback record
/// instead of an error. A single bad AI response never blocks the session.
pub struct AnswerEvaluator {
    client: Arc<dyn TextGenerator>,
    pace: Duration,
}

impl AnswerEvaluator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self {
            client,
            pace: DEFAULT_PACE,
        }
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub async fn evaluate(
        &self,
        question: &QuestionRecord,
        user_answer: &str,
    ) -> AnswerEvaluation {
        match self.try_evaluate(question, user_answer).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!("AI evaluation unavailable, using fallback record: {}", e);
                AnswerEvaluation::fallback_record()
            }
        }
    }

    /// Evaluate every answered-but-unevaluated question in the session,
    /// strictly one call at a time with `pace` between calls. Returns the
    /// number of answers evaluated.
    pub async fn evaluate_pending(&self, session: &mut InterviewSession) -> usize {
        let pending = session.pending_evaluation_indices();
        if pending.is_empty() {
            return 0;
        }

        info!("Evaluating {} pending answers", pending.len());

        let mut evaluated = 0;
        for (position, index) in pending.iter().copied().enumerate() {
            if position > 0 && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }

            let (question, answer_text) = match session.question_and_answer(index) {
                Some((q, a)) => (q.clone(), a.to_string()),
                None => continue,
            };

            let evaluation = self.evaluate(&question, &answer_text).await;
            if session.apply_evaluation(index, evaluation).is_ok() {
                evaluated += 1;
            }
        }

        info!("Batch evaluation complete: {} answers scored", evaluated);
        evaluated
    }

    async fn try_evaluate(
        &self,
        question: &QuestionRecord,
        user_answer: &str,
    ) -> ai::Result<AnswerEvaluation> {
        let prompt = prompts::evaluation_prompt(question, user_answer);
        let raw = self.client.send_prompt(&prompt).await?;
        if raw.trim().is_empty() {
            return Err(AiError::Generation(
                "text generation service returned empty output".to_string(),
            ));
        }

        let value = normalize(&raw, Shape::Object)?;
        if !value.is_object() {
            return Err(AiError::Validation(
                "expected a JSON evaluation object".to_string(),
            ));
        }

        Ok(Self::from_loose(&value))
    }

    /// Coerce a loosely structured evaluation object into a usable record.
    /// Scores are clamped into [1, 10], non-list fields replaced by
    /// single-element defaults, missing strings by fixed placeholders.
    fn from_loose(value: &Value) -> AnswerEvaluation {
        AnswerEvaluation {
            rating: score_field(value, "rating"),
            feedback: string_field(value, &["feedback", "aiFeedback"], "Feedback not provided"),
            strengths: list_field(value, "strengths", "Strengths not specified"),
            areas_for_improvement: list_field(
                value,
                "areasForImprovement",
                "Areas for improvement not specified",
            ),
            specific_suggestions: list_field(
                value,
                "specificSuggestions",
                "Suggestions not provided",
            ),
            technical_accuracy: score_field(value, "technicalAccuracy"),
            communication: score_field(value, "communication"),
            problem_solving: score_field(value, "problemSolving"),
            overall_assessment: string_field(
                value,
                &["overallAssessment"],
                "Overall assessment not provided",
            ),
            fallback: false,
        }
    }
}

fn score_field(value: &Value, key: &str) -> i32 {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|score| (score.round() as i64).clamp(1, 10) as i32)
        .unwrap_or(5)
}

fn string_field(value: &Value, keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn list_field(value: &Value, key: &str, default: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|items| !items.is_empty())
        .unwrap_or_else(|| vec![default.to_string()])
}
