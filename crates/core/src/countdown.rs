//! One-second countdown for a single exam session.

/// Default exam length: 30 minutes.
pub const EXAM_DURATION_SECS: u32 = 30 * 60;

/// Remaining time at or below which the timer is rendered as a warning.
pub const LOW_TIME_WARNING_SECS: u32 = 5 * 60;

/// Emitted exactly once, on the tick that brings the countdown to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUp;

/// Countdown from a fixed duration to zero, advanced by explicit ticks.
///
/// The clock knows nothing about submissions; it only reports `TimeUp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    duration: u32,
    remaining: u32,
    running: bool,
    signalled: bool,
}

impl SessionClock {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            running: true,
            signalled: false,
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(TimeUp)` on the tick that reaches zero and `None`
    /// otherwise, including every tick after expiry or after `stop`.
    pub fn tick(&mut self) -> Option<TimeUp> {
        if !self.running || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 && !self.signalled {
            self.signalled = true;
            self.running = false;
            return Some(TimeUp);
        }
        None
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// True once the countdown has reached zero through ticking.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.signalled
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Halt ticking permanently. Remaining time is frozen.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining <= LOW_TIME_WARNING_SECS
    }
}

/// Render seconds as `MM:SS`, both fields zero-padded to two digits.
#[must_use]
pub fn format_remaining(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes:02}:{remainder:02}")
}
