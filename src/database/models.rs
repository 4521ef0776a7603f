use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DatabaseError, Result};
use crate::interview::{AnswerEvaluation, AnswerRecord, QuestionRecord};

/// A generated mock interview: job parameters plus the serialized question
/// set, attributed to the identity-provider email of its creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockInterview {
    pub mock_id: Uuid,
    pub job_position: String,
    pub job_description: String,
    pub job_experience: i32,
    /// Question set as a JSON blob; the store only round-trips it.
    pub questions_json: String,
    /// Session mean rating, written when the interview is finished. `None`
    /// until then, or when no answer was ever evaluated.
    pub overall_rating: Option<f64>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl MockInterview {
    pub fn new(
        job_position: &str,
        job_description: &str,
        job_experience: u32,
        questions: &[QuestionRecord],
        created_by: &str,
    ) -> Result<Self> {
        let questions_json = serde_json::to_string(questions)
            .map_err(|e| DatabaseError::SerializationFailed(e.to_string()))?;

        Ok(MockInterview {
            mock_id: Uuid::new_v4(),
            job_position: job_position.to_string(),
            job_description: job_description.to_string(),
            job_experience: job_experience as i32,
            questions_json,
            overall_rating: None,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn questions(&self) -> Result<Vec<QuestionRecord>> {
        serde_json::from_str(&self.questions_json)
            .map_err(|e| DatabaseError::SerializationFailed(e.to_string()))
    }
}

/// One persisted answer row, keyed by `(mock_id, question_index)`. List
/// fields are stored as serialized JSON text. `evaluated_at` is written
/// together with the rating, never separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswerRow {
    pub mock_id: Uuid,
    pub question_index: i32,
    pub question: String,
    pub expected_answer: Option<String>,
    pub user_answer: Option<String>,
    pub user_audio: Option<String>,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub specific_suggestions: Option<String>,
    pub technical_accuracy: Option<i32>,
    pub communication: Option<i32>,
    pub problem_solving: Option<i32>,
    pub overall_assessment: Option<String>,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl UserAnswerRow {
    pub fn from_answer(
        mock_id: Uuid,
        question: &QuestionRecord,
        record: &AnswerRecord,
        user_email: &str,
    ) -> Result<Self> {
        let mut row = UserAnswerRow {
            mock_id,
            question_index: record.question_index as i32,
            question: question.question.clone(),
            expected_answer: Some(question.answer.clone()),
            user_answer: Some(record.answer_text.clone()),
            user_audio: record.audio_ref.clone(),
            rating: None,
            feedback: None,
            strengths: None,
            areas_for_improvement: None,
            specific_suggestions: None,
            technical_accuracy: None,
            communication: None,
            problem_solving: None,
            overall_assessment: None,
            user_email: Some(user_email.to_string()),
            created_at: record.created_at,
            evaluated_at: None,
        };

        if let Some(evaluation) = &record.evaluation {
            row.set_evaluation(evaluation, record.evaluated_at.unwrap_or_else(Utc::now))?;
        }
        Ok(row)
    }

    pub fn set_evaluation(
        &mut self,
        evaluation: &AnswerEvaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.rating = Some(evaluation.rating);
        self.feedback = Some(evaluation.feedback.clone());
        self.strengths = Some(serialize_list(&evaluation.strengths)?);
        self.areas_for_improvement = Some(serialize_list(&evaluation.areas_for_improvement)?);
        self.specific_suggestions = Some(serialize_list(&evaluation.specific_suggestions)?);
        self.technical_accuracy = Some(evaluation.technical_accuracy);
        self.communication = Some(evaluation.communication);
        self.problem_solving = Some(evaluation.problem_solving);
        self.overall_assessment = Some(evaluation.overall_assessment.clone());
        self.evaluated_at = Some(evaluated_at);
        Ok(())
    }

    /// Rebuild the evaluation from the row's columns, if the answer was ever
    /// scored. Missing text columns fall back to neutral placeholders; the
    /// rating column alone decides whether an evaluation exists.
    pub fn evaluation(&self) -> Option<AnswerEvaluation> {
        let rating = self.rating?;
        Some(AnswerEvaluation {
            rating,
            feedback: self
                .feedback
                .clone()
                .unwrap_or_else(|| "Feedback not provided".to_string()),
            strengths: self.strengths_list(),
            areas_for_improvement: self.areas_for_improvement_list(),
            specific_suggestions: self.specific_suggestions_list(),
            technical_accuracy: self.technical_accuracy.unwrap_or(rating),
            communication: self.communication.unwrap_or(rating),
            problem_solving: self.problem_solving.unwrap_or(rating),
            overall_assessment: self
                .overall_assessment
                .clone()
                .unwrap_or_else(|| "Overall assessment not provided".to_string()),
            fallback: false,
        })
    }

    pub fn strengths_list(&self) -> Vec<String> {
        deserialize_list(self.strengths.as_deref())
    }

    pub fn areas_for_improvement_list(&self) -> Vec<String> {
        deserialize_list(self.areas_for_improvement.as_deref())
    }

    pub fn specific_suggestions_list(&self) -> Vec<String> {
        deserialize_list(self.specific_suggestions.as_deref())
    }
}

fn serialize_list(items: &[String]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| DatabaseError::SerializationFailed(e.to_string()))
}

fn deserialize_list(text: Option<&str>) -> Vec<String> {
    text.and_then(|t| serde_json::from_str(t).ok())
        .unwrap_or_default()
}
