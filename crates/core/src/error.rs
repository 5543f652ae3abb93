use thiserror::Error;

use crate::session::SessionStatus;

/// Errors surfaced by the exam session controller.
///
/// `LoadFailure` and `SubmissionFailure` carry a message meant for the
/// candidate, verbatim from the collaborator. `IllegalTransition` is a
/// contract violation by the caller and should be logged, not displayed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("{0}")]
    LoadFailure(String),

    #[error("{0}")]
    SubmissionFailure(String),

    #[error("submission already in progress")]
    SubmissionInProgress,

    #[error("`{operation}` is not allowed while the session is {status}")]
    IllegalTransition {
        operation: &'static str,
        status: SessionStatus,
    },
}

impl SessionError {
    /// Whether this error should be shown to the candidate.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::LoadFailure(_) | Self::SubmissionFailure(_))
    }
}
