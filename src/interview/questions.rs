use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Technical,
    SystemDesign,
    Behavioral,
    ProblemSolving,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Technical => "technical",
            QuestionCategory::SystemDesign => "system_design",
            QuestionCategory::Behavioral => "behavioral",
            QuestionCategory::ProblemSolving => "problem_solving",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Junior,
    Mid,
    Senior,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Junior => "junior",
            Difficulty::Mid => "mid",
            Difficulty::Senior => "senior",
        }
    }
}

/// One interview prompt plus its reference answer and scoring metadata.
/// Immutable once generated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    #[serde(rename = "keyPoints")]
    pub key_points: Vec<String>,
    #[serde(rename = "scoringCriteria")]
    pub scoring_criteria: BTreeMap<String, String>,
}

impl QuestionRecord {
    /// Build a record from one loosely structured element of a model response.
    /// Missing or mistyped fields are defaulted, never rejected, so a question
    /// set survives a partially sloppy response.
    pub fn from_loose(value: &Value, index: usize) -> Self {
        let question = string_field(value, "question")
            .unwrap_or_else(|| format!("Question {}", index + 1));
        let answer = string_field(value, "answer")
            .unwrap_or_else(|| "Expected answer not provided".to_string());

        let category = value
            .get("category")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(QuestionCategory::Technical);
        let difficulty = value
            .get("difficulty")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(Difficulty::Mid);

        let key_points = value
            .get("keyPoints")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|points| !points.is_empty())
            .unwrap_or_else(|| vec!["Key points not provided".to_string()]);

        let scoring_criteria = value
            .get("scoringCriteria")
            .and_then(Value::as_object)
            .map(|bands| {
                bands
                    .iter()
                    .filter_map(|(band, text)| text.as_str().map(|t| (band.clone(), t.to_string())))
                    .collect::<BTreeMap<_, _>>()
            })
            .filter(|bands| !bands.is_empty())
            .unwrap_or_else(default_scoring_criteria);

        QuestionRecord {
            question,
            answer,
            category,
            difficulty,
            key_points,
            scoring_criteria,
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Fixed four-band rubric used when the model omits scoring criteria.
pub fn default_scoring_criteria() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "excellent".to_string(),
            "9-10 points: Excellent understanding".to_string(),
        ),
        (
            "good".to_string(),
            "7-8 points: Good understanding".to_string(),
        ),
        (
            "average".to_string(),
            "5-6 points: Average understanding".to_string(),
        ),
        (
            "poor".to_string(),
            "1-4 points: Needs improvement".to_string(),
        ),
    ])
}
