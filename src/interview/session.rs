use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::answers::{AnswerEvaluation, AnswerRecord};
use super::questions::QuestionRecord;
use super::{Result, SessionError};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionStatus {
    Pending,
    Answered,
    Skipped,
}

/// Per-question status and rating in original question order. Summary views
/// keep this order even when ratings tie.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuestionSummary {
    pub index: usize,
    pub status: QuestionStatus,
    pub rating: Option<i32>,
}

/// Tracks one candidate's progression through a generated question set.
///
/// Driven by a single UI actor at a time; all mutation happens through the
/// owning value, so no internal locking. Transition errors leave state
/// untouched.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InterviewSession {
    session_id: String,
    phase: SessionPhase,
    questions: Vec<QuestionRecord>,
    statuses: Vec<QuestionStatus>,
    answers: Vec<Option<AnswerRecord>>,
    active_index: usize,
}

impl InterviewSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        InterviewSession {
            session_id: session_id.into(),
            phase: SessionPhase::NotStarted,
            questions: Vec::new(),
            statuses: Vec::new(),
            answers: Vec::new(),
            active_index: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn status(&self, index: usize) -> Result<QuestionStatus> {
        self.check_index(index)?;
        Ok(self.statuses[index])
    }

    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    /// Begin the interview with a generated question set.
    pub fn start(&mut self, questions: Vec<QuestionRecord>) -> Result<()> {
        if self.phase != SessionPhase::NotStarted {
            return Err(SessionError::InvalidTransition(format!(
                "session {} already started",
                self.session_id
            )));
        }
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }

        info!(
            "Starting interview session {} with {} questions",
            self.session_id,
            questions.len()
        );

        self.statuses = vec![QuestionStatus::Pending; questions.len()];
        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.active_index = 0;
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    /// Navigate to any question in range. Does not change question status.
    pub fn go_to(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.active_index = index;
        Ok(())
    }

    /// Record the candidate's answer and mark the question Answered.
    /// Re-submitting overwrites the prior record (last write wins) and clears
    /// its evaluation; a previously skipped question may also be answered.
    pub fn submit_answer(&mut self, index: usize, answer_text: &str) -> Result<()> {
        self.submit_answer_with_audio(index, answer_text, None)
    }

    pub fn submit_answer_with_audio(
        &mut self,
        index: usize,
        answer_text: &str,
        audio_ref: Option<String>,
    ) -> Result<()> {
        self.check_in_progress("submit answer")?;
        self.check_index(index)?;

        let mut record = AnswerRecord::new(index, answer_text.to_string());
        if let Some(audio_ref) = audio_ref {
            record = record.with_audio_ref(audio_ref);
        }

        if self.statuses[index] == QuestionStatus::Answered {
            debug!(
                "Overwriting previous answer for question {} in session {}",
                index, self.session_id
            );
        }

        self.answers[index] = Some(record);
        self.statuses[index] = QuestionStatus::Answered;

        if index == self.active_index {
            if let Some(next) = self.next_pending_after(index) {
                self.active_index = next;
            }
        }
        Ok(())
    }

    /// Mark a pending question as skipped. Skipping an answered (or already
    /// skipped) question is an invalid transition and leaves status unchanged.
    pub fn skip(&mut self, index: usize) -> Result<()> {
        self.check_in_progress("skip question")?;
        self.check_index(index)?;

        if self.statuses[index] != QuestionStatus::Pending {
            return Err(SessionError::InvalidTransition(format!(
                "cannot skip question {} in status {:?}",
                index, self.statuses[index]
            )));
        }

        self.statuses[index] = QuestionStatus::Skipped;
        Ok(())
    }

    /// Attach an evaluation to a submitted answer. Sets `evaluated_at`
    /// together with the rating.
    pub fn apply_evaluation(&mut self, index: usize, evaluation: AnswerEvaluation) -> Result<()> {
        self.apply_evaluation_at(index, evaluation, Utc::now())
    }

    /// Attach an evaluation with an explicit timestamp. Used when replaying
    /// persisted answers, where the original `evaluated_at` must be kept.
    pub fn apply_evaluation_at(
        &mut self,
        index: usize,
        evaluation: AnswerEvaluation,
        evaluated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_index(index)?;
        match self.answers[index].as_mut() {
            Some(record) => {
                record.apply_evaluation_at(evaluation, evaluated_at);
                Ok(())
            }
            None => Err(SessionError::InvalidTransition(format!(
                "question {} has no submitted answer to evaluate",
                index
            ))),
        }
    }

    /// End the session. Remaining questions may be abandoned; only an empty
    /// session cannot be finished.
    pub fn finish(&mut self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }
        info!(
            "Interview session {} completed ({} answered, {} skipped of {})",
            self.session_id,
            self.count(QuestionStatus::Answered),
            self.count(QuestionStatus::Skipped),
            self.questions.len()
        );
        self.phase = SessionPhase::Completed;
        Ok(())
    }

    /// Mean of evaluated ratings rounded to one decimal place. `None` (not
    /// zero) while no answer has been evaluated.
    pub fn overall_rating(&self) -> Option<f64> {
        let ratings: Vec<i32> = self
            .answers
            .iter()
            .flatten()
            .filter_map(AnswerRecord::rating)
            .collect();

        if ratings.is_empty() {
            return None;
        }

        let mean = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    }

    /// Indices answered but not yet evaluated, in question order.
    pub fn pending_evaluation_indices(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(index, answer)| match answer {
                Some(record) if record.evaluation.is_none() => Some(index),
                _ => None,
            })
            .collect()
    }

    pub fn question_and_answer(&self, index: usize) -> Option<(&QuestionRecord, &str)> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(index)?.as_ref()?;
        Some((question, answer.answer_text.as_str()))
    }

    pub fn summary(&self) -> Vec<QuestionSummary> {
        self.statuses
            .iter()
            .enumerate()
            .map(|(index, status)| QuestionSummary {
                index,
                status: *status,
                rating: self.answer(index).and_then(AnswerRecord::rating),
            })
            .collect()
    }

    /// Terminal means the caller has finished the session and every question
    /// was answered or skipped. Never true for a session that has not
    /// started.
    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Completed
            && self
                .statuses
                .iter()
                .all(|status| *status != QuestionStatus::Pending)
    }

    fn count(&self, status: QuestionStatus) -> usize {
        self.statuses.iter().filter(|s| **s == status).count()
    }

    /// First pending index strictly after `index`, wrapping around once.
    fn next_pending_after(&self, index: usize) -> Option<usize> {
        let len = self.questions.len();
        (1..len)
            .map(|step| (index + step) % len)
            .find(|candidate| self.statuses[*candidate] == QuestionStatus::Pending)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(())
    }

    fn check_in_progress(&self, action: &str) -> Result<()> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::InvalidTransition(format!(
                "cannot {} while session is {:?}",
                action, self.phase
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::questions::{Difficulty, QuestionCategory};

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

    fn started(count: usize) -> InterviewSession {
        let mut session = InterviewSession::new("test-session");
        session
            .start((0..count).map(|i| question(&format!("Q{}", i))).collect())
            .unwrap();
        session
    }

    fn rated(rating: i32) -> AnswerEvaluation {
        AnswerEvaluation {
            rating,
            ..AnswerEvaluation::fallback_record()
        }
    }

    #[test]
    fn test_start_with_empty_set_fails() {
        let mut session = InterviewSession::new("empty");
        let err = session.start(vec![]).unwrap_err();
        assert!(matches!(err, SessionError::EmptyQuestionSet));
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut session = started(2);
        let err = session.start(vec![question("again")]).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
    }

    #[test]
    fn test_submit_advances_to_next_pending() {
        let mut session = started(3);
        session.submit_answer(0, "a0").unwrap();
        assert_eq!(session.active_index(), 1);
        assert_eq!(session.status(0).unwrap(), QuestionStatus::Answered);
        assert_eq!(session.status(1).unwrap(), QuestionStatus::Pending);
    }

    #[test]
    fn test_submit_wraps_to_earlier_pending() {
        let mut session = started(3);
        session.go_to(1).unwrap();
        session.submit_answer(1, "a1").unwrap();
        session.submit_answer(2, "a2").unwrap();
        // Only question 0 is still pending; active wraps back to it.
        assert_eq!(session.active_index(), 0);
    }

    #[test]
    fn test_submit_out_of_range_fails() {
        let mut session = started(2);
        let err = session.submit_answer(5, "nope").unwrap_err();
        assert!(matches!(
            err,
            SessionError::IndexOutOfRange { index: 5, len: 2 }
        ));
    }

    #[test]
    fn test_resubmit_overwrites_and_clears_evaluation() {
        let mut session = started(2);
        session.submit_answer(0, "first try").unwrap();
        session.apply_evaluation(0, rated(9)).unwrap();
        assert_eq!(session.answer(0).unwrap().rating(), Some(9));

        session.submit_answer(0, "second try").unwrap();
        let record = session.answer(0).unwrap();
        assert_eq!(record.answer_text, "second try");
        assert!(record.evaluation.is_none());
        assert!(record.evaluated_at.is_none());
    }

    #[test]
    fn test_skip_only_from_pending() {
        let mut session = started(2);
        session.submit_answer(0, "answered").unwrap();

        let err = session.skip(0).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
        assert_eq!(session.status(0).unwrap(), QuestionStatus::Answered);

        session.skip(1).unwrap();
        assert_eq!(session.status(1).unwrap(), QuestionStatus::Skipped);
        let err = session.skip(1).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
    }

    #[test]
    fn test_skipped_question_can_still_be_answered() {
        let mut session = started(2);
        session.skip(0).unwrap();
        session.submit_answer(0, "changed my mind").unwrap();
        assert_eq!(session.status(0).unwrap(), QuestionStatus::Answered);
    }

    #[test]
    fn test_go_to_does_not_change_status() {
        let mut session = started(3);
        session.submit_answer(0, "a0").unwrap();
        session.go_to(0).unwrap();
        assert_eq!(session.active_index(), 0);
        assert_eq!(session.status(0).unwrap(), QuestionStatus::Answered);

        let err = session.go_to(10).unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfRange { .. }));
        assert_eq!(session.active_index(), 0);
    }

    #[test]
    fn test_overall_rating_undefined_before_evaluation() {
        let mut session = started(2);
        assert_eq!(session.overall_rating(), None);
        session.submit_answer(0, "a0").unwrap();
        // Answered but not yet evaluated still counts as undefined.
        assert_eq!(session.overall_rating(), None);
    }

    #[test]
    fn test_overall_rating_is_rounded_mean() {
        let mut session = started(3);
        for (index, rating) in [(0, 8), (1, 6), (2, 10)] {
            session.submit_answer(index, "answer").unwrap();
            session.apply_evaluation(index, rated(rating)).unwrap();
        }
        assert_eq!(session.overall_rating(), Some(8.0));

        let mut session = started(2);
        for (index, rating) in [(0, 7), (1, 8)] {
            session.submit_answer(index, "answer").unwrap();
            session.apply_evaluation(index, rated(rating)).unwrap();
        }
        assert_eq!(session.overall_rating(), Some(7.5));
    }

    #[test]
    fn test_apply_evaluation_requires_answer() {
        let mut session = started(2);
        let err = session.apply_evaluation(0, rated(7)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
    }

    #[test]
    fn test_finish_allows_abandoned_questions() {
        let mut session = started(3);
        session.submit_answer(0, "only one").unwrap();
        session.finish().unwrap();
        assert_eq!(session.phase(), SessionPhase::Completed);
        // Two questions were abandoned, so the session never became terminal.
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_fresh_session_is_not_terminal() {
        assert!(!InterviewSession::new("fresh").is_terminal());
    }

    #[test]
    fn test_terminal_requires_finish_and_full_resolution() {
        let mut session = started(2);
        session.submit_answer(0, "answer").unwrap();
        session.skip(1).unwrap();
        // Every question resolved, but the caller has not ended the session.
        assert!(!session.is_terminal());

        session.finish().unwrap();
        assert!(session.is_terminal());
    }

    #[test]
    fn test_finish_without_questions_fails() {
        let mut session = InterviewSession::new("never-started");
        let err = session.finish().unwrap_err();
        assert!(matches!(err, SessionError::EmptyQuestionSet));
    }

    #[test]
    fn test_summary_keeps_question_order() {
        let mut session = started(3);
        for index in [2, 0] {
            session.submit_answer(index, "answer").unwrap();
            session.apply_evaluation(index, rated(8)).unwrap();
        }
        session.skip(1).unwrap();

        let summary = session.summary();
        let indices: Vec<usize> = summary.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(summary[0].rating, Some(8));
        assert_eq!(summary[1].status, QuestionStatus::Skipped);
        assert_eq!(summary[2].rating, Some(8));
    }

    #[test]
    fn test_submit_after_finish_fails() {
        let mut session = started(2);
        session.finish().unwrap();
        let err = session.submit_answer(0, "late").unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition(_)));
    }
}
