use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use log::{error, info};
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use super::models::{MockInterview, UserAnswerRow};
use super::{DatabaseError, Result};
use crate::config::DatabaseConfig;
use crate::interview::AnswerEvaluation;

#[derive(Debug)]
pub struct DatabaseManager {
    pool: Pool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}@{}:{}/{}",
            config.user, config.host, config.port, config.dbname
        );

        let mut cfg = Config::new();
        cfg.url = Some(config.url());
        cfg.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Pool creation failed: {}", e)))?;

        // Test connection
        let _client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        info!("Database connection established successfully");

        Ok(DatabaseManager { pool })
    }

    pub async fn insert_mock_interview(&self, mock: &MockInterview) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                r#"
                INSERT INTO mock_interviews
                    (mock_id, job_position, job_description, job_experience,
                     questions_json, overall_rating, created_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
                &[
                    &mock.mock_id,
                    &mock.job_position,
                    &mock.job_description,
                    &mock.job_experience,
                    &mock.questions_json,
                    &mock.overall_rating,
                    &mock.created_by,
                    &mock.created_at,
                ],
            )
            .await
            .map_err(|e| {
                error!("Failed to insert mock interview {}: {}", mock.mock_id, e);
                DatabaseError::QueryFailed(format!("Failed to insert mock interview: {}", e))
            })?;

        info!(
            "Stored mock interview {} for {} position",
            mock.mock_id, mock.job_position
        );
        Ok(())
    }

    pub async fn get_mock_interview(&self, mock_id: Uuid) -> Result<MockInterview> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let row = client
            .query_one(
                r#"
                SELECT mock_id, job_position, job_description, job_experience,
                       questions_json, overall_rating, created_by, created_at
                FROM mock_interviews
                WHERE mock_id = $1
                "#,
                &[&mock_id],
            )
            .await
            .map_err(|e| {
                error!("Failed to fetch mock interview {}: {}", mock_id, e);
                DatabaseError::InterviewNotFound(mock_id.to_string())
            })?;

        Ok(mock_interview_from_row(&row))
    }

    pub async fn list_mock_interviews(&self, created_by: &str) -> Result<Vec<MockInterview>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query(
                r#"
                SELECT mock_id, job_position, job_description, job_experience,
                       questions_json, overall_rating, created_by, created_at
                FROM mock_interviews
                WHERE created_by = $1
                ORDER BY created_at DESC
                "#,
                &[&created_by],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to list interviews: {}", e)))?;

        Ok(rows.iter().map(mock_interview_from_row).collect())
    }

    /// Insert or overwrite an answer row. Re-submission is last write wins,
    /// matching the session semantics.
    pub async fn upsert_user_answer(&self, answer: &UserAnswerRow) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        client
            .execute(
                r#"
                INSERT INTO user_answers
                    (mock_id, question_index, question, expected_answer, user_answer,
                     user_audio, rating, feedback, strengths, areas_for_improvement,
                     specific_suggestions, technical_accuracy, communication,
                     problem_solving, overall_assessment, user_email, created_at,
                     evaluated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                        $15, $16, $17, $18)
                ON CONFLICT (mock_id, question_index) DO UPDATE SET
                    user_answer = EXCLUDED.user_answer,
                    user_audio = EXCLUDED.user_audio,
                    rating = EXCLUDED.rating,
                    feedback = EXCLUDED.feedback,
                    strengths = EXCLUDED.strengths,
                    areas_for_improvement = EXCLUDED.areas_for_improvement,
                    specific_suggestions = EXCLUDED.specific_suggestions,
                    technical_accuracy = EXCLUDED.technical_accuracy,
                    communication = EXCLUDED.communication,
                    problem_solving = EXCLUDED.problem_solving,
                    overall_assessment = EXCLUDED.overall_assessment,
                    created_at = EXCLUDED.created_at,
                    evaluated_at = EXCLUDED.evaluated_at
                "#,
                &[
                    &answer.mock_id,
                    &answer.question_index,
                    &answer.question,
                    &answer.expected_answer,
                    &answer.user_answer,
                    &answer.user_audio,
                    &answer.rating,
                    &answer.feedback,
                    &answer.strengths,
                    &answer.areas_for_improvement,
                    &answer.specific_suggestions,
                    &answer.technical_accuracy,
                    &answer.communication,
                    &answer.problem_solving,
                    &answer.overall_assessment,
                    &answer.user_email,
                    &answer.created_at,
                    &answer.evaluated_at,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    "Failed to store answer {}/{}: {}",
                    answer.mock_id, answer.question_index, e
                );
                DatabaseError::QueryFailed(format!("Failed to store answer: {}", e))
            })?;

        Ok(())
    }

    /// Write evaluation fields for one answer. The rating and `evaluated_at`
    /// always land together.
    pub async fn update_answer_evaluation(
        &self,
        mock_id: Uuid,
        question_index: i32,
        evaluation: &AnswerEvaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let strengths = serde_json::to_string(&evaluation.strengths)
            .map_err(|e| DatabaseError::SerializationFailed(e.to_string()))?;
        let areas = serde_json::to_string(&evaluation.areas_for_improvement)
            .map_err(|e| DatabaseError::SerializationFailed(e.to_string()))?;
        let suggestions = serde_json::to_string(&evaluation.specific_suggestions)
            .map_err(|e| DatabaseError::SerializationFailed(e.to_string()))?;

        let rows_affected = client
            .execute(
                r#"
                UPDATE user_answers
                SET rating = $1, feedback = $2, strengths = $3,
                    areas_for_improvement = $4, specific_suggestions = $5,
                    technical_accuracy = $6, communication = $7,
                    problem_solving = $8, overall_assessment = $9,
                    evaluated_at = $10
                WHERE mock_id = $11 AND question_index = $12
                "#,
                &[
                    &evaluation.rating,
                    &evaluation.feedback,
                    &strengths,
                    &areas,
                    &suggestions,
                    &evaluation.technical_accuracy,
                    &evaluation.communication,
                    &evaluation.problem_solving,
                    &evaluation.overall_assessment,
                    &evaluated_at,
                    &mock_id,
                    &question_index,
                ],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to update evaluation: {}", e)))?;

        if rows_affected == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "No answer row for {}/{}",
                mock_id, question_index
            )));
        }
        Ok(())
    }

    /// Store the session mean rating on a finished interview.
    pub async fn update_overall_rating(&self, mock_id: Uuid, overall_rating: f64) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let rows_affected = client
            .execute(
                "UPDATE mock_interviews SET overall_rating = $1 WHERE mock_id = $2",
                &[&overall_rating, &mock_id],
            )
            .await
            .map_err(|e| {
                error!("Failed to store overall rating for {}: {}", mock_id, e);
                DatabaseError::QueryFailed(format!("Failed to store overall rating: {}", e))
            })?;

        if rows_affected == 0 {
            return Err(DatabaseError::InterviewNotFound(mock_id.to_string()));
        }
        Ok(())
    }

    pub async fn get_user_answers(&self, mock_id: Uuid) -> Result<Vec<UserAnswerRow>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let rows = client
            .query(
                r#"
                SELECT mock_id, question_index, question, expected_answer, user_answer,
                       user_audio, rating, feedback, strengths, areas_for_improvement,
                       specific_suggestions, technical_accuracy, communication,
                       problem_solving, overall_assessment, user_email, created_at,
                       evaluated_at
                FROM user_answers
                WHERE mock_id = $1
                ORDER BY question_index
                "#,
                &[&mock_id],
            )
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to fetch answers: {}", e)))?;

        Ok(rows.iter().map(user_answer_from_row).collect())
    }
}

fn mock_interview_from_row(row: &Row) -> MockInterview {
    MockInterview {
        mock_id: row.get(0),
        job_position: row.get(1),
        job_description: row.get(2),
        job_experience: row.get(3),
        questions_json: row.get(4),
        overall_rating: row.get(5),
        created_by: row.get(6),
        created_at: row.get(7),
    }
}

fn user_answer_from_row(row: &Row) -> UserAnswerRow {
    UserAnswerRow {
        mock_id: row.get(0),
        question_index: row.get(1),
        question: row.get(2),
        expected_answer: row.get(3),
        user_answer: row.get(4),
        user_audio: row.get(5),
        rating: row.get(6),
        feedback: row.get(7),
        strengths: row.get(8),
        areas_for_improvement: row.get(9),
        specific_suggestions: row.get(10),
        technical_accuracy: row.get(11),
        communication: row.get(12),
        problem_solving: row.get(13),
        overall_assessment: row.get(14),
        user_email: row.get(15),
        created_at: row.get(16),
        evaluated_at: row.get(17),
    }
}
