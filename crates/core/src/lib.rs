#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod model;
pub mod session;
pub mod time;

pub use countdown::{EXAM_DURATION_SECS, SessionClock, TimeUp, format_remaining};
pub use error::SessionError;
pub use gate::{GateError, SubmissionGate, SubmissionState};
pub use ledger::AnswerLedger;
pub use session::{
    ExamSession, SessionSnapshot, SessionStatus, SubmissionTicket, TickOutcome,
};
pub use time::Clock;
