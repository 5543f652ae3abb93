use std::sync::Arc;

use tracing::{info, instrument, warn};

use exam_core::model::{ExamId, ExamRecord, ExamResult};
use exam_core::{Clock, ExamSession, SessionError, SessionStatus};

use crate::config::ExamConfig;
use crate::error::ApiError;
use crate::ports::{ExamArchive, ExamGrader, QuestionSource};
use crate::sessions::{SUBMIT_FAILED_MESSAGE, SessionDriver, SessionHandle};

pub const START_FAILED_MESSAGE: &str = "Failed to start exam. Please try again.";

/// Starts, submits and looks up exams.
#[derive(Clone)]
pub struct ExamService {
    questions: Arc<dyn QuestionSource>,
    grader: Arc<dyn ExamGrader>,
    archive: Arc<dyn ExamArchive>,
    config: ExamConfig,
    clock: Clock,
}

impl ExamService {
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionSource>,
        grader: Arc<dyn ExamGrader>,
        archive: Arc<dyn ExamArchive>,
        config: ExamConfig,
    ) -> Self {
        Self {
            questions,
            grader,
            archive,
            config,
            clock: Clock::default_clock(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> ExamConfig {
        self.config
    }

    /// Fetch questions and build a session from them.
    ///
    /// A load failure does not fail the call: the session comes back in the
    /// `Error` state carrying the message to show.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` so the caller can send the candidate
    /// back to login.
    #[instrument(skip(self), fields(duration = self.config.duration_secs))]
    pub async fn start_session(&self) -> Result<ExamSession, ApiError> {
        let outcome = match self.questions.load_questions().await {
            Ok(questions) => {
                info!(count = questions.len(), "questions loaded");
                Ok(questions)
            }
            Err(err) if err.is_unauthorized() => return Err(err),
            Err(err) => {
                warn!(%err, "could not load questions");
                Err(err.user_message(START_FAILED_MESSAGE))
            }
        };

        Ok(ExamSession::from_load(
            self.config.duration_secs,
            self.clock,
            outcome,
        ))
    }

    /// Submit `session` and wait for the grade, without a background driver.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot be submitted in its
    /// current state.
    #[instrument(skip(self, session), fields(status = %session.status()))]
    pub async fn submit(&self, session: &mut ExamSession) -> Result<SessionStatus, SessionError> {
        let Some(ticket) = session.begin_submit()? else {
            return Ok(session.status());
        };
        let outcome = self
            .grader
            .grade(&ticket.answers)
            .await
            .map_err(|err| {
                warn!(%err, attempt = ticket.attempt, "grading failed");
                err.user_message(SUBMIT_FAILED_MESSAGE)
            });
        session.finish_submit(outcome)
    }

    /// Hand `session` to a background driver that runs its countdown.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn_session(&self, session: ExamSession) -> SessionHandle {
        SessionDriver::spawn(session, Arc::clone(&self.grader))
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the result cannot be fetched.
    pub async fn fetch_result(&self, exam_id: ExamId) -> Result<ExamResult, ApiError> {
        self.archive.fetch_result(exam_id).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the history cannot be fetched.
    pub async fn history(&self) -> Result<Vec<ExamRecord>, ApiError> {
        self.archive.history().await
    }
}

impl std::fmt::Debug for ExamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
