use chrono::{DateTime, Utc};
use std::fmt;

use crate::countdown::{EXAM_DURATION_SECS, SessionClock, TimeUp};
use crate::error::SessionError;
use crate::gate::{GateError, SubmissionGate, SubmissionState};
use crate::ledger::AnswerLedger;
use crate::model::{AnswerSubmission, ExamResult, OptionLabel, Question};
use crate::time::Clock;

/// Message used when the loader hands over an empty question set.
pub const NO_QUESTIONS_MESSAGE: &str =
    "No exam questions available. Please start a new exam from the dashboard.";

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Observable state of an exam session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    #[default]
    Loading,
    Active,
    Submitting,
    Completed,
    Failed,
    Error,
    Abandoned,
}

impl SessionStatus {
    /// No further transitions except abandonment.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Abandoned)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Submitting => "submitting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Loading,
    Ready,
    Error(String),
    Abandoned,
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Answers captured at the moment the session entered `Submitting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub attempt: u32,
    pub answers: Vec<AnswerSubmission>,
}

impl SubmissionTicket {
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| !answer.is_blank()).count()
    }
}

/// Result of advancing the session by one second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not counting down.
    Idle,
    Ticked { remaining: u32 },
    /// Time ran out and the session submitted itself.
    TimeUp(SubmissionTicket),
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub remaining_secs: u32,
    /// Remaining time is inside the warning window.
    pub low_time: bool,
    pub answered: usize,
    pub total: usize,
    pub current_index: usize,
    pub current_question: Option<Question>,
    pub current_selection: Option<OptionLabel>,
    pub message: Option<String>,
    pub result: Option<ExamResult>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.total
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at an exam, from question load to a terminal outcome.
///
/// Composes the countdown, the answer ledger and the submission gate. All
/// operations are synchronous; the grading round-trip happens outside, between
/// `begin_submit` and `finish_submit`.
pub struct ExamSession {
    clock: Clock,
    phase: Phase,
    questions: Vec<Question>,
    ledger: AnswerLedger,
    current: usize,
    countdown: SessionClock,
    gate: SubmissionGate,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new(EXAM_DURATION_SECS)
    }
}

impl ExamSession {
    /// Create a session waiting for its questions.
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            clock: Clock::default_clock(),
            phase: Phase::Loading,
            questions: Vec::new(),
            ledger: AnswerLedger::new(),
            current: 0,
            countdown: SessionClock::new(duration_secs),
            gate: SubmissionGate::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Replace the clock used for timestamps.
    ///
    /// A session that has loaded but not yet ticked or submitted is
    /// re-stamped with the new clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        let untouched = self.countdown.remaining() == self.countdown.duration()
            && self.gate.attempts() == 0;
        if self.started_at.is_some() && untouched {
            self.started_at = Some(self.clock.now());
        }
        self
    }

    /// Create a session and load `questions` in one step.
    #[must_use]
    pub fn start(duration_secs: u32, questions: Vec<Question>) -> Self {
        Self::from_load(duration_secs, Clock::default_clock(), Ok(questions))
    }

    /// Create a session from the loader's outcome, stamped with `clock`.
    ///
    /// Same transitions as `load` on a fresh session.
    #[must_use]
    pub fn from_load(
        duration_secs: u32,
        clock: Clock,
        outcome: Result<Vec<Question>, String>,
    ) -> Self {
        let mut session = Self::new(duration_secs);
        session.clock = clock;
        session.apply_questions(outcome);
        session
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match &self.phase {
            Phase::Loading => SessionStatus::Loading,
            Phase::Error(_) => SessionStatus::Error,
            Phase::Abandoned => SessionStatus::Abandoned,
            Phase::Ready => match self.gate.state() {
                SubmissionState::Idle => SessionStatus::Active,
                SubmissionState::Submitting => SessionStatus::Submitting,
                SubmissionState::Completed(_) => SessionStatus::Completed,
                SubmissionState::Failed(_) => SessionStatus::Failed,
            },
        }
    }

    /// Hand the loader's outcome to a `Loading` session.
    ///
    /// A non-empty question list activates the session and starts the
    /// countdown. An empty list or a loader failure is terminal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IllegalTransition` if the session is not loading.
    pub fn load(
        &mut self,
        outcome: Result<Vec<Question>, String>,
    ) -> Result<SessionStatus, SessionError> {
        let status = self.status();
        if status != SessionStatus::Loading {
            return Err(SessionError::IllegalTransition {
                operation: "load",
                status,
            });
        }
        self.apply_questions(outcome);
        Ok(self.status())
    }

    fn apply_questions(&mut self, outcome: Result<Vec<Question>, String>) {
        match outcome {
            Ok(questions) if questions.is_empty() => {
                self.phase = Phase::Error(NO_QUESTIONS_MESSAGE.to_owned());
                self.countdown.stop();
            }
            Ok(questions) => {
                self.questions = questions;
                self.phase = Phase::Ready;
                self.started_at = Some(self.clock.now());
            }
            Err(message) => {
                self.phase = Phase::Error(message);
                self.countdown.stop();
            }
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_selection(&self) -> Option<OptionLabel> {
        self.current_question()
            .and_then(|question| self.ledger.get(question.id()))
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.ledger.answered_count()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn countdown(&self) -> &SessionClock {
        &self.countdown
    }

    #[must_use]
    pub fn submission_attempts(&self) -> u32 {
        self.gate.attempts()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn result(&self) -> Option<&ExamResult> {
        match self.gate.state() {
            SubmissionState::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// The candidate-facing error for `Error` and `Failed` sessions.
    #[must_use]
    pub fn error(&self) -> Option<SessionError> {
        if let Phase::Error(message) = &self.phase {
            return Some(SessionError::LoadFailure(message.clone()));
        }
        match self.gate.state() {
            SubmissionState::Failed(message) if self.phase == Phase::Ready => {
                Some(SessionError::SubmissionFailure(message.clone()))
            }
            _ => None,
        }
    }

    /// `Ok(true)` when the operation should run, `Ok(false)` when it is a
    /// no-op on a finished session.
    fn guard(&self, operation: &'static str) -> Result<bool, SessionError> {
        match self.status() {
            SessionStatus::Active => Ok(true),
            SessionStatus::Completed | SessionStatus::Abandoned => Ok(false),
            status => Err(SessionError::IllegalTransition { operation, status }),
        }
    }

    /// Record `option` for the current question, replacing any earlier pick.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IllegalTransition` unless the session is active.
    pub fn select_answer(&mut self, option: OptionLabel) -> Result<(), SessionError> {
        if !self.guard("select_answer")? {
            return Ok(());
        }
        if let Some(id) = self.current_question().map(Question::id) {
            self.ledger.set(id, option);
        }
        Ok(())
    }

    /// Move to the next question. Stays put on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IllegalTransition` unless the session is active.
    pub fn next(&mut self) -> Result<(), SessionError> {
        if !self.guard("next")? {
            return Ok(());
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(())
    }

    /// Move to the previous question. Stays put on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IllegalTransition` unless the session is active.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        if !self.guard("previous")? {
            return Ok(());
        }
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// When time runs out the session submits itself with whatever answers
    /// are recorded and hands back the ticket for grading.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status() != SessionStatus::Active {
            return TickOutcome::Idle;
        }
        match self.countdown.tick() {
            Some(TimeUp) => match self.enter_submitting() {
                Ok(ticket) => TickOutcome::TimeUp(ticket),
                Err(_) => TickOutcome::Idle,
            },
            None => TickOutcome::Ticked {
                remaining: self.countdown.remaining(),
            },
        }
    }

    /// Capture the answers and enter `Submitting`.
    ///
    /// Returns `Ok(None)` on a completed or abandoned session. A `Failed`
    /// session may submit again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmissionInProgress` while a submission is in
    /// flight and `SessionError::IllegalTransition` while loading or errored.
    pub fn begin_submit(&mut self) -> Result<Option<SubmissionTicket>, SessionError> {
        match self.status() {
            SessionStatus::Active | SessionStatus::Failed => self.enter_submitting().map(Some),
            SessionStatus::Submitting => Err(SessionError::SubmissionInProgress),
            SessionStatus::Completed | SessionStatus::Abandoned => Ok(None),
            status @ (SessionStatus::Loading | SessionStatus::Error) => {
                Err(SessionError::IllegalTransition {
                    operation: "submit",
                    status,
                })
            }
        }
    }

    fn enter_submitting(&mut self) -> Result<SubmissionTicket, SessionError> {
        let status = self.status();
        self.gate.try_submit().map_err(|err| match err {
            GateError::InProgress => SessionError::SubmissionInProgress,
            _ => SessionError::IllegalTransition {
                operation: "submit",
                status,
            },
        })?;
        self.countdown.stop();
        Ok(SubmissionTicket {
            attempt: self.gate.attempts(),
            answers: self.ledger.to_submissions(&self.questions),
        })
    }

    /// Apply the grading outcome of the in-flight submission.
    ///
    /// On an abandoned session the outcome is discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IllegalTransition` if no submission is in flight.
    pub fn finish_submit(
        &mut self,
        outcome: Result<ExamResult, String>,
    ) -> Result<SessionStatus, SessionError> {
        let status = self.status();
        if status == SessionStatus::Abandoned {
            return Ok(status);
        }
        let applied = match outcome {
            Ok(result) => self.gate.complete(result),
            Err(message) => self.gate.fail(message),
        };
        applied.map_err(|_| SessionError::IllegalTransition {
            operation: "finish_submit",
            status,
        })?;
        if self.status() == SessionStatus::Completed {
            self.finished_at = Some(self.clock.now());
        }
        Ok(self.status())
    }

    /// Leave the session. The countdown stops and any late grading outcome is
    /// discarded.
    pub fn abandon(&mut self) {
        self.countdown.stop();
        self.phase = Phase::Abandoned;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            remaining_secs: self.remaining_secs(),
            low_time: self.countdown.is_low(),
            answered: self.answered_count(),
            total: self.total_questions(),
            current_index: self.current,
            current_question: self.current_question().cloned(),
            current_selection: self.current_selection(),
            message: self.error().map(|err| err.to_string()),
            result: self.result().cloned(),
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("status", &self.status())
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.ledger.answered_count())
            .field("remaining", &self.countdown.remaining())
            .field("attempts", &self.gate.attempts())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
