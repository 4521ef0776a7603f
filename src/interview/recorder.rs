use log::{debug, warn};

use super::{Result, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// The capture resource for spoken answers, owned by the active question.
///
/// The device itself lives outside the core; this models its two-state
/// lifecycle and accumulates the transcript fragments the speech layer
/// delivers. Switching questions forcibly releases the resource and discards
/// any in-flight, unsubmitted recording.
#[derive(Debug)]
pub struct AnswerRecorder {
    state: RecorderState,
    question_index: Option<usize>,
    fragments: Vec<String>,
}

impl AnswerRecorder {
    pub fn new() -> Self {
        AnswerRecorder {
            state: RecorderState::Idle,
            question_index: None,
            fragments: Vec::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn question_index(&self) -> Option<usize> {
        self.question_index
    }

    pub fn start(&mut self, question_index: usize) -> Result<()> {
        if self.state == RecorderState::Recording {
            return Err(SessionError::InvalidTransition(
                "recorder is already recording".to_string(),
            ));
        }
        debug!("Recorder acquired for question {}", question_index);
        self.state = RecorderState::Recording;
        self.question_index = Some(question_index);
        self.fragments.clear();
        Ok(())
    }

    pub fn push_fragment(&mut self, text: &str) -> Result<()> {
        if self.state != RecorderState::Recording {
            return Err(SessionError::InvalidTransition(
                "cannot add transcript fragments while idle".to_string(),
            ));
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.fragments.push(trimmed.to_string());
        }
        Ok(())
    }

    /// Stop recording and return the accumulated transcript.
    pub fn stop(&mut self) -> Result<String> {
        if self.state != RecorderState::Recording {
            return Err(SessionError::InvalidTransition(
                "recorder is not recording".to_string(),
            ));
        }
        let transcript = self.fragments.join(" ");
        self.release();
        Ok(transcript)
    }

    /// Move the recorder to another question, discarding any in-flight
    /// recording for the previous one.
    pub fn switch_question(&mut self, question_index: usize) {
        if self.state == RecorderState::Recording {
            warn!(
                "Discarding unsubmitted recording for question {:?} ({} fragments)",
                self.question_index,
                self.fragments.len()
            );
        }
        self.release();
        self.question_index = Some(question_index);
    }

    fn release(&mut self) {
        self.state = RecorderState::Idle;
        self.fragments.clear();
    }
}

impl Default for AnswerRecorder {
    fn default() -> Self {
        Self::new()
    }
}
