use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::ai::TextGenerator;
use crate::database::{DatabaseManager, MockInterview, UserAnswerRow};

use super::evaluator::AnswerEvaluator;
use super::generator::QuestionSetGenerator;
use super::session::InterviewSession;
use super::AnswerEvaluation;

/// Ties generation, persistence, session progression, and evaluation
/// together: generate a question set, store it, walk the candidate through
/// it, score answers eagerly or in a deferred batch.
pub struct InterviewEngine {
    generator: QuestionSetGenerator,
    evaluator: AnswerEvaluator,
    db: DatabaseManager,
}

impl InterviewEngine {
    pub fn new(client: Arc<dyn TextGenerator>, db: DatabaseManager) -> Self {
        InterviewEngine {
            generator: QuestionSetGenerator::new(client.clone()),
            evaluator: AnswerEvaluator::new(client),
            db,
        }
    }

    pub fn evaluator(&self) -> &AnswerEvaluator {
        &self.evaluator
    }

    /// Generate and persist a new mock interview, returning the stored record
    /// and a started session. Generation failures surface to the caller;
    /// interview creation cannot proceed without questions.
    pub async fn create_mock_interview(
        &self,
        job_position: &str,
        job_description: &str,
        years_experience: u32,
        question_count: usize,
        created_by: &str,
    ) -> Result<(MockInterview, InterviewSession)> {
        let questions = self
            .generator
            .generate(job_position, job_description, years_experience, question_count)
            .await?;

        let mock = MockInterview::new(
            job_position,
            job_description,
            years_experience,
            &questions,
            created_by,
        )?;
        self.db.insert_mock_interview(&mock).await?;

        let mut session = InterviewSession::new(mock.mock_id.to_string());
        session.start(questions)?;

        info!(
            "Created mock interview {} ({} questions) for {}",
            mock.mock_id, session.questions().len(), created_by
        );
        Ok((mock, session))
    }

    /// Rebuild a session from a previously stored mock interview, replaying
    /// every persisted answer so statuses, ratings, and timestamps survive
    /// the round trip.
    pub async fn resume_mock_interview(
        &self,
        mock_id: uuid::Uuid,
    ) -> Result<(MockInterview, InterviewSession)> {
        let mock = self.db.get_mock_interview(mock_id).await?;
        let answers = self.db.get_user_answers(mock_id).await?;
        let session = rehydrate_session(&mock, &answers)?;

        info!(
            "Resumed mock interview {} with {} stored answers",
            mock.mock_id,
            answers.len()
        );
        Ok((mock, session))
    }

    /// Submit an answer and evaluate it immediately (eager mode). The
    /// evaluation never fails; on inference failure the persisted row carries
    /// the neutral fallback record.
    pub async fn submit_answer(
        &self,
        mock: &MockInterview,
        session: &mut InterviewSession,
        index: usize,
        answer_text: &str,
        audio_ref: Option<String>,
        user_email: &str,
    ) -> Result<AnswerEvaluation> {
        session.submit_answer_with_audio(index, answer_text, audio_ref)?;

        let question = session.questions()[index].clone();
        let evaluation = self.evaluator.evaluate(&question, answer_text).await;
        session.apply_evaluation(index, evaluation.clone())?;

        self.persist_answer(mock, session, index, user_email).await?;
        Ok(evaluation)
    }

    /// Submit an answer without evaluating it (deferred mode); a later
    /// `evaluate_pending` pass scores it.
    pub async fn record_answer(
        &self,
        mock: &MockInterview,
        session: &mut InterviewSession,
        index: usize,
        answer_text: &str,
        audio_ref: Option<String>,
        user_email: &str,
    ) -> Result<()> {
        session.submit_answer_with_audio(index, answer_text, audio_ref)?;
        self.persist_answer(mock, session, index, user_email).await
    }

    /// Evaluate every answered-but-unevaluated question and persist the
    /// results. Returns the number of answers evaluated.
    pub async fn evaluate_pending(
        &self,
        mock: &MockInterview,
        session: &mut InterviewSession,
    ) -> Result<usize> {
        let pending = session.pending_evaluation_indices();
        let evaluated = self.evaluator.evaluate_pending(session).await;

        for index in pending {
            if let Some(record) = session.answer(index) {
                if let (Some(evaluation), Some(evaluated_at)) =
                    (&record.evaluation, record.evaluated_at)
                {
                    self.db
                        .update_answer_evaluation(
                            mock.mock_id,
                            index as i32,
                            evaluation,
                            evaluated_at,
                        )
                        .await?;
                }
            }
        }
        Ok(evaluated)
    }

    /// Complete the session, store the overall rating on the interview
    /// record, and return it. The rating stays `None` (and the stored column
    /// null) when no answer was ever evaluated.
    pub async fn finish(
        &self,
        mock: &MockInterview,
        session: &mut InterviewSession,
    ) -> Result<Option<f64>> {
        session.finish()?;
        let rating = session.overall_rating();
        if let Some(rating) = rating {
            self.db.update_overall_rating(mock.mock_id, rating).await?;
        }
        info!(
            "Session {} finished with overall rating {:?}",
            session.session_id(),
            rating
        );
        Ok(rating)
    }

    async fn persist_answer(
        &self,
        mock: &MockInterview,
        session: &InterviewSession,
        index: usize,
        user_email: &str,
    ) -> Result<()> {
        let question = &session.questions()[index];
        let record = session
            .answer(index)
            .ok_or_else(|| anyhow::anyhow!("no answer record at index {}", index))?;
        let row = UserAnswerRow::from_answer(mock.mock_id, question, record, user_email)?;
        self.db.upsert_user_answer(&row).await?;
        Ok(())
    }
}

/// Build a started session from a stored interview and its answer rows,
/// replaying each answered question together with its evaluation and the
/// timestamp it was scored at. Rows that no longer match a question index are
/// dropped with a warning.
fn rehydrate_session(
    mock: &MockInterview,
    answers: &[UserAnswerRow],
) -> Result<InterviewSession> {
    let questions = mock.questions()?;
    let question_count = questions.len();

    let mut session = InterviewSession::new(mock.mock_id.to_string());
    session.start(questions)?;

    for row in answers {
        let index = row.question_index as usize;
        if row.question_index < 0 || index >= question_count {
            warn!(
                "Dropping stored answer {}/{}: index out of range for {} questions",
                row.mock_id, row.question_index, question_count
            );
            continue;
        }
        let answer_text = match &row.user_answer {
            Some(text) => text,
            None => continue,
        };

        session.submit_answer_with_audio(index, answer_text, row.user_audio.clone())?;
        if let (Some(evaluation), Some(evaluated_at)) = (row.evaluation(), row.evaluated_at) {
            session.apply_evaluation_at(index, evaluation, evaluated_at)?;
        }
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::{
        AnswerRecord, Difficulty, QuestionCategory, QuestionRecord, QuestionStatus,
    };

    fn question(text: &str) -> QuestionRecord {
        QuestionRecord {
            question: text.to_string(),
            answer: format!("reference answer for {}", text),
            category: QuestionCategory::Technical,
            difficulty: Difficulty::Mid,
            key_points: vec!["point".to_string()],
            scoring_criteria: Default::default(),
        }
    }

    fn stored_interview(count: usize) -> MockInterview {
        let questions: Vec<QuestionRecord> =
            (0..count).map(|i| question(&format!("Q{}", i))).collect();
        MockInterview::new("Backend Engineer", "Go, Postgres", 3, &questions, "a@b.c").unwrap()
    }

    fn answer_row(mock: &MockInterview, index: usize, rating: Option<i32>) -> UserAnswerRow {
        let mut record = AnswerRecord::new(index, format!("answer {}", index));
        if let Some(rating) = rating {
            record.apply_evaluation(AnswerEvaluation {
                rating,
                ..AnswerEvaluation::fallback_record()
            });
        }
        let questions = mock.questions().unwrap();
        UserAnswerRow::from_answer(mock.mock_id, &questions[index], &record, "a@b.c").unwrap()
    }

    #[test]
    fn test_rehydrate_restores_progress_and_ratings() {
        let mock = stored_interview(3);
        let evaluated = answer_row(&mock, 0, Some(9));
        let stored_at = evaluated.evaluated_at.unwrap();
        let rows = vec![evaluated, answer_row(&mock, 1, None)];

        let session = rehydrate_session(&mock, &rows).unwrap();

        assert_eq!(session.status(0).unwrap(), QuestionStatus::Answered);
        let record = session.answer(0).unwrap();
        assert_eq!(record.rating(), Some(9));
        assert_eq!(record.evaluated_at, Some(stored_at));

        assert_eq!(session.status(1).unwrap(), QuestionStatus::Answered);
        assert_eq!(session.pending_evaluation_indices(), vec![1]);
        assert_eq!(session.status(2).unwrap(), QuestionStatus::Pending);
        assert_eq!(session.overall_rating(), Some(9.0));
    }

    #[test]
    fn test_rehydrate_ignores_out_of_range_rows() {
        let mock = stored_interview(2);
        let mut stale = answer_row(&mock, 0, Some(7));
        stale.question_index = 9;

        let session = rehydrate_session(&mock, &[stale]).unwrap();

        assert_eq!(session.status(0).unwrap(), QuestionStatus::Pending);
        assert_eq!(session.status(1).unwrap(), QuestionStatus::Pending);
        assert_eq!(session.overall_rating(), None);
    }
}
