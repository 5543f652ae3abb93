use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use exam_core::model::{ExamResult, OptionLabel};
use exam_core::{
    ExamSession, SessionError, SessionSnapshot, SessionStatus, SubmissionTicket, TickOutcome,
};

use crate::error::ApiError;
use crate::ports::ExamGrader;

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit exam";

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Candidate input forwarded to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Select(OptionLabel),
    Next,
    Previous,
    Submit,
    Abandon,
}

/// Owns an `ExamSession` on a background task.
///
/// Serializes the one-second countdown, candidate commands and the grading
/// round-trip onto a single loop so the session only ever sees one event at
/// a time. Every event is followed by a fresh snapshot on the watch channel.
pub struct SessionDriver {
    session: ExamSession,
    grader: Arc<dyn ExamGrader>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionDriver {
    /// Start driving `session` and return the handle used to talk to it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(session: ExamSession, grader: Arc<dyn ExamGrader>) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());
        let driver = Self {
            session,
            grader,
            commands: commands_rx,
            snapshots: snapshots_tx,
        };
        SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            task: tokio::spawn(driver.run()),
        }
    }

    async fn run(self) -> ExamSession {
        let Self {
            mut session,
            grader,
            mut commands,
            snapshots,
        } = self;

        let mut ticker = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut grading: Option<JoinHandle<Result<ExamResult, ApiError>>> = None;

        while !session.status().is_terminal() {
            let active = session.status() == SessionStatus::Active;
            tokio::select! {
                _ = ticker.tick(), if active => {
                    if let TickOutcome::TimeUp(ticket) = session.tick() {
                        info!(answered = ticket.answered_count(), "time is up; submitting");
                        grading = Some(spawn_grading(&grader, ticket));
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => apply(&mut session, command, &grader, &mut grading),
                    None => {
                        debug!("session handle dropped; abandoning");
                        session.abandon();
                    }
                },
                outcome = async {
                    match grading.as_mut() {
                        Some(task) => task.await,
                        None => std::future::pending().await,
                    }
                }, if grading.is_some() => {
                    grading = None;
                    settle(&mut session, outcome);
                }
            }
            snapshots.send_replace(session.snapshot());
        }

        if grading.is_some() {
            debug!("detaching in-flight grading; its outcome will be discarded");
        }
        info!(status = %session.status(), "session finished");
        session
    }
}

fn apply(
    session: &mut ExamSession,
    command: SessionCommand,
    grader: &Arc<dyn ExamGrader>,
    grading: &mut Option<JoinHandle<Result<ExamResult, ApiError>>>,
) {
    let outcome = match command {
        SessionCommand::Select(option) => session.select_answer(option),
        SessionCommand::Next => session.next(),
        SessionCommand::Previous => session.previous(),
        SessionCommand::Submit => session.begin_submit().map(|ticket| {
            if let Some(ticket) = ticket {
                info!(attempt = ticket.attempt, answered = ticket.answered_count(), "submitting");
                *grading = Some(spawn_grading(grader, ticket));
            }
        }),
        SessionCommand::Abandon => {
            session.abandon();
            Ok(())
        }
    };

    match outcome {
        Ok(()) => {}
        Err(SessionError::SubmissionInProgress) => debug!("submit ignored; already submitting"),
        Err(err) => warn!(%err, ?command, "command rejected"),
    }
}

fn settle(session: &mut ExamSession, outcome: Result<Result<ExamResult, ApiError>, JoinError>) {
    let outcome = match outcome {
        Ok(Ok(result)) => {
            info!(exam_id = %result.exam_id, percentage = result.percentage, "exam graded");
            Ok(result)
        }
        Ok(Err(err)) => {
            warn!(%err, "grading failed");
            Err(err.user_message(SUBMIT_FAILED_MESSAGE))
        }
        Err(err) => {
            warn!(%err, "grading task did not finish");
            Err(SUBMIT_FAILED_MESSAGE.to_owned())
        }
    };
    if let Err(err) = session.finish_submit(outcome) {
        warn!(%err, "grading outcome not applied");
    }
}

fn spawn_grading(
    grader: &Arc<dyn ExamGrader>,
    ticket: SubmissionTicket,
) -> JoinHandle<Result<ExamResult, ApiError>> {
    let grader = Arc::clone(grader);
    tokio::spawn(async move { grader.grade(&ticket.answers).await })
}

/// Front end of a running `SessionDriver`.
///
/// Dropping the handle abandons the session.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<ExamSession>,
}

impl SessionHandle {
    /// Queue `command`. Returns `false` once the driver has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn select(&self, option: OptionLabel) -> bool {
        self.send(SessionCommand::Select(option))
    }

    pub fn next(&self) -> bool {
        self.send(SessionCommand::Next)
    }

    pub fn previous(&self) -> bool {
        self.send(SessionCommand::Previous)
    }

    pub fn submit(&self) -> bool {
        self.send(SessionCommand::Submit)
    }

    pub fn abandon(&self) -> bool {
        self.send(SessionCommand::Abandon)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// Returns `None` if the driver stops first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Option<SessionSnapshot> {
        let mut receiver = self.snapshots.clone();
        receiver
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }

    /// Wait for the driver to stop and take the session back.
    ///
    /// The driver stops once the session completes, errors or is abandoned,
    /// so a `Failed` session keeps this pending until it is retried or
    /// abandoned.
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the driver task panicked or was cancelled.
    pub async fn join(self) -> Result<ExamSession, JoinError> {
        let Self { commands, task, .. } = self;
        let session = task.await;
        drop(commands);
        session
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("status", &self.snapshots.borrow().status)
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}
