use std::env;
use std::time::Duration;

use exam_core::EXAM_DURATION_SECS;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the exam server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `EXAM_API_URL`, falling back to the local development server.
    #[must_use]
    pub fn from_env() -> Self {
        env::var("EXAM_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(Self::default, Self::new)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Per-session knobs for the exam itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExamConfig {
    pub duration_secs: u32,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_secs: EXAM_DURATION_SECS,
        }
    }
}

impl ExamConfig {
    /// Reads `EXAM_DURATION_SECS`; zero or unparsable values keep the default.
    #[must_use]
    pub fn from_env() -> Self {
        env::var("EXAM_DURATION_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|secs| *secs > 0)
            .map_or_else(Self::default, |duration_secs| Self { duration_secs })
    }
}
