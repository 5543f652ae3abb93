//! Collaborator contracts consumed by the exam services.

use async_trait::async_trait;

use exam_core::model::{AnswerSubmission, ExamId, ExamRecord, ExamResult, Question};

use crate::error::ApiError;

/// Supplies the questions for a new session. Called once per session start.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the questions cannot be fetched.
    async fn load_questions(&self) -> Result<Vec<Question>, ApiError>;
}

/// Grades a submission remotely.
#[async_trait]
pub trait ExamGrader: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the grading request fails.
    async fn grade(&self, answers: &[AnswerSubmission]) -> Result<ExamResult, ApiError>;
}

/// Read access to graded exams.
#[async_trait]
pub trait ExamArchive: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the result cannot be fetched.
    async fn fetch_result(&self, exam_id: ExamId) -> Result<ExamResult, ApiError>;

    /// Completed exams, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the history cannot be fetched.
    async fn history(&self) -> Result<Vec<ExamRecord>, ApiError>;
}
