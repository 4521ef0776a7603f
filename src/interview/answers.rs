use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI-produced scoring for one answer. All score fields are held in [1, 10].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvaluation {
    pub rating: i32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub specific_suggestions: Vec<String>,
    pub technical_accuracy: i32,
    pub communication: i32,
    pub problem_solving: i32,
    pub overall_assessment: String,
    /// True when AI scoring could not be obtained and this record is the
    /// neutral default. Informational only; fallback ratings still count
    /// toward the session mean.
    #[serde(default)]
    pub fallback: bool,
}

impl AnswerEvaluation {
    /// Neutral record returned when the service is unreachable or its output
    /// cannot be parsed. Evaluation never blocks session progression.
    pub fn fallback_record() -> Self {
        AnswerEvaluation {
            rating: 5,
            feedback: "Unable to generate AI feedback. Please review your answer against the expected response.".to_string(),
            strengths: vec!["Attempted to answer the question".to_string()],
            areas_for_improvement: vec!["Could improve clarity and depth".to_string()],
            specific_suggestions: vec!["Practice explaining technical concepts clearly".to_string()],
            technical_accuracy: 5,
            communication: 5,
            problem_solving: 5,
            overall_assessment: "Basic response provided. Consider adding more specific examples and technical details.".to_string(),
            fallback: true,
        }
    }
}

/// One candidate response. Created when the answer is submitted; the
/// evaluation fields are written exactly once when scoring completes.
/// `evaluated_at` is set iff `evaluation` is present.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub answer_text: String,
    /// Opaque reference to a stored audio blob, when the answer was spoken.
    pub audio_ref: Option<String>,
    pub evaluation: Option<AnswerEvaluation>,
    pub created_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl AnswerRecord {
    pub fn new(question_index: usize, answer_text: String) -> Self {
        AnswerRecord {
            question_index,
            answer_text,
            audio_ref: None,
            evaluation: None,
            created_at: Utc::now(),
            evaluated_at: None,
        }
    }

    pub fn with_audio_ref(mut self, audio_ref: String) -> Self {
        self.audio_ref = Some(audio_ref);
        self
    }

    pub fn apply_evaluation(&mut self, evaluation: AnswerEvaluation) {
        self.apply_evaluation_at(evaluation, Utc::now());
    }

    /// Attach an evaluation with an explicit timestamp, used when replaying
    /// persisted rows so `evaluated_at` survives a resume.
    pub fn apply_evaluation_at(
        &mut self,
        evaluation: AnswerEvaluation,
        evaluated_at: DateTime<Utc>,
    ) {
        self.evaluation = Some(evaluation);
        self.evaluated_at = Some(evaluated_at);
    }

    pub fn rating(&self) -> Option<i32> {
        self.evaluation.as_ref().map(|e| e.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluated_at_set_with_evaluation() {
        let mut record = AnswerRecord::new(0, "my answer".to_string());
        assert!(record.evaluated_at.is_none());
        assert!(record.rating().is_none());

        record.apply_evaluation(AnswerEvaluation::fallback_record());
        assert!(record.evaluated_at.is_some());
        assert_eq!(record.rating(), Some(5));
    }

    #[test]
    fn test_fallback_record_is_flagged_and_neutral() {
        let eval = AnswerEvaluation::fallback_record();
        assert!(eval.fallback);
        assert_eq!(eval.rating, 5);
        assert_eq!(eval.technical_accuracy, 5);
        assert_eq!(eval.strengths.len(), 1);
    }
}
