//! End-to-end flow over a scripted text-generation client: generate a
//! question set, walk the session, evaluate answers, aggregate the rating.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use mockprep::ai::{AiError, Result as AiResult, TextGenerator};
use mockprep::interview::{
    AnswerEvaluator, InterviewSession, QuestionSetGenerator, QuestionStatus, SessionPhase,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Replays a fixed queue of responses, one per prompt.
struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedClient {
    async fn send_prompt(&self, _prompt: &str) -> AiResult<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AiError::Generation("script exhausted".to_string()))
    }
}

fn question_set_response(count: usize) -> String {
    let questions: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "question": format!("Question {} about Go and Postgres", i + 1),
                "answer": format!("Reference answer {}", i + 1),
                "category": "technical",
                "difficulty": "mid",
                "keyPoints": ["depth", "examples"],
            })
        })
        .collect();
    format!("```json\n{}\n```", json!(questions))
}

fn evaluation_response(rating: i32) -> String {
    json!({
        "rating": rating,
        "feedback": "Solid answer",
        "strengths": ["clear"],
        "areasForImprovement": ["detail"],
        "specificSuggestions": ["add an example"],
        "technicalAccuracy": rating,
        "communication": rating,
        "problemSolving": rating,
        "overallAssessment": "Good performance"
    })
    .to_string()
}

#[tokio::test]
async fn test_full_interview_flow_with_deferred_evaluation() {
    init_logging();
    let client = Arc::new(ScriptedClient::new(vec![
        question_set_response(5),
        evaluation_response(8),
        evaluation_response(6),
        evaluation_response(10),
    ]));

    let generator = QuestionSetGenerator::new(client.clone());
    let questions = generator
        .generate("Backend Engineer", "Go, Postgres", 3, 5)
        .await
        .unwrap();

    assert_eq!(questions.len(), 5);
    for question in &questions {
        assert!(!question.question.is_empty());
        assert!(!question.answer.is_empty());
        assert!(!question.key_points.is_empty());
        assert_eq!(question.scoring_criteria.len(), 4);
    }

    let mut session = InterviewSession::new("flow-test");
    session.start(questions).unwrap();
    assert_eq!(session.phase(), SessionPhase::InProgress);

    // Answer three questions, skip one, abandon the last.
    session.submit_answer(0, "I'd index the lookup column").unwrap();
    session.submit_answer(1, "Use goroutines with a worker pool").unwrap();
    session.submit_answer(2, "Connection pooling via pgbouncer").unwrap();
    session.skip(3).unwrap();

    assert_eq!(session.overall_rating(), None);
    assert_eq!(session.pending_evaluation_indices(), vec![0, 1, 2]);

    let evaluator = AnswerEvaluator::new(client).with_pace(Duration::ZERO);
    let evaluated = evaluator.evaluate_pending(&mut session).await;
    assert_eq!(evaluated, 3);

    // Ratings [8, 6, 10] -> mean 8.0.
    assert_eq!(session.overall_rating(), Some(8.0));

    session.finish().unwrap();
    assert_eq!(session.phase(), SessionPhase::Completed);

    let summary = session.summary();
    assert_eq!(summary.len(), 5);
    assert_eq!(summary[0].rating, Some(8));
    assert_eq!(summary[3].status, QuestionStatus::Skipped);
    assert_eq!(summary[4].status, QuestionStatus::Pending);
}

#[tokio::test]
async fn test_eager_evaluation_falls_back_when_script_runs_dry() {
    init_logging();
    // One response for generation, none for evaluation: the evaluator must
    // produce a flagged fallback record instead of failing the session.
    let client = Arc::new(ScriptedClient::new(vec![question_set_response(2)]));

    let generator = QuestionSetGenerator::new(client.clone());
    let questions = generator
        .generate("Backend Engineer", "Go, Postgres", 3, 2)
        .await
        .unwrap();

    let mut session = InterviewSession::new("fallback-flow");
    session.start(questions.clone()).unwrap();
    session.submit_answer(0, "an answer").unwrap();

    let evaluator = AnswerEvaluator::new(client).with_pace(Duration::ZERO);
    let evaluation = evaluator.evaluate(&questions[0], "an answer").await;
    assert!(evaluation.fallback);

    session.apply_evaluation(0, evaluation).unwrap();
    assert_eq!(session.overall_rating(), Some(5.0));
}
