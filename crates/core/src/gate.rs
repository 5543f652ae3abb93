//! At-most-one in-flight submission per session.

use thiserror::Error;

use crate::model::ExamResult;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GateError {
    #[error("submission already in progress")]
    InProgress,

    #[error("exam already submitted")]
    Completed,

    #[error("no submission in progress")]
    NotSubmitting,
}

/// Lifecycle of the exam submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Completed(ExamResult),
    Failed(String),
}

impl SubmissionState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Guards the transition into `Submitting`.
///
/// `try_submit` is synchronous, so a second caller observes `Submitting`
/// before any grading I/O starts. A failed attempt stays `Failed` until the
/// next `try_submit`, which resets and re-enters `Submitting` in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionGate {
    state: SubmissionState,
    attempts: u32,
}

impl SubmissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Number of times the gate has entered `Submitting`.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Enter `Submitting` from `Idle` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InProgress` while a submission is in flight and
    /// `GateError::Completed` once the exam has been graded.
    pub fn try_submit(&mut self) -> Result<(), GateError> {
        match self.state {
            SubmissionState::Submitting => Err(GateError::InProgress),
            SubmissionState::Completed(_) => Err(GateError::Completed),
            SubmissionState::Idle | SubmissionState::Failed(_) => {
                self.state = SubmissionState::Submitting;
                self.attempts = self.attempts.saturating_add(1);
                Ok(())
            }
        }
    }

    /// Record a successful grading round-trip.
    ///
    /// # Errors
    ///
    /// Returns `GateError::NotSubmitting` unless a submission is in flight.
    pub fn complete(&mut self, result: ExamResult) -> Result<(), GateError> {
        if !self.state.is_submitting() {
            return Err(GateError::NotSubmitting);
        }
        self.state = SubmissionState::Completed(result);
        Ok(())
    }

    /// Record a failed grading round-trip.
    ///
    /// # Errors
    ///
    /// Returns `GateError::NotSubmitting` unless a submission is in flight.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), GateError> {
        if !self.state.is_submitting() {
            return Err(GateError::NotSubmitting);
        }
        self.state = SubmissionState::Failed(message.into());
        Ok(())
    }

    /// Explicitly return a failed gate to `Idle`. No-op in any other state.
    pub fn reset(&mut self) {
        if matches!(self.state, SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
        }
    }
}
