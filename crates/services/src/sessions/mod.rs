//! Background driving of exam sessions.

pub mod driver;

pub use driver::{SUBMIT_FAILED_MESSAGE, SessionCommand, SessionDriver, SessionHandle};
