use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ExamId, OptionLabel, QuestionId, UserId};

/// One entry of the payload sent to the grading endpoint.
///
/// `selected_answer` is the option letter, or an empty string for an
/// unanswered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub selected_answer: String,
}

impl AnswerSubmission {
    #[must_use]
    pub fn new(question_id: QuestionId, selected: Option<OptionLabel>) -> Self {
        Self {
            question_id,
            selected_answer: selected.map(|label| label.as_str().to_owned()).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.selected_answer.is_empty()
    }
}

/// Graded outcome of an exam, computed by the server.
///
/// The submit endpoint omits the timestamps; the results endpoint carries them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub exam_id: ExamId,
    pub score: f64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
    #[serde(default, deserialize_with = "crate::model::wire_time::deserialize_option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::model::wire_time::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ExamResult {
    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.total_questions.saturating_sub(self.correct_answers)
    }
}

/// A past exam attempt as listed by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: ExamId,
    #[serde(deserialize_with = "crate::model::wire_time::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "crate::model::wire_time::deserialize_option")]
    pub end_time: Option<DateTime<Utc>>,
    pub is_completed: bool,
    #[serde(default)]
    pub score: Option<f64>,
    pub total_questions: u32,
    pub correct_answers: u32,
}

/// Account returned by the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(deserialize_with = "crate::model::wire_time::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanswered_submission_is_blank() {
        let blank = AnswerSubmission::new(QuestionId::new(1), None);
        assert!(blank.is_blank());
        assert_eq!(blank.selected_answer, "");

        let answered = AnswerSubmission::new(QuestionId::new(2), Some(OptionLabel::C));
        assert_eq!(answered.selected_answer, "C");
    }

    #[test]
    fn submit_response_without_timestamps_decodes() {
        let json = r#"{"exam_id":9,"score":70.0,"total_questions":10,"correct_answers":7,"percentage":70.0}"#;
        let result: ExamResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.exam_id, ExamId::new(9));
        assert_eq!(result.incorrect_answers(), 3);
        assert!(result.start_time.is_none());
        assert!(result.end_time.is_none());
    }

    #[test]
    fn results_and_history_decode_naive_timestamps() {
        let json = r#"{
            "exam_id": 9,
            "score": 70.0,
            "total_questions": 10,
            "correct_answers": 7,
            "percentage": 70.0,
            "start_time": "2024-05-01T10:00:00.123456",
            "end_time": "2024-05-01T10:25:30"
        }"#;
        let result: ExamResult = serde_json::from_str(json).unwrap();
        let start = result.start_time.unwrap();
        let end = result.end_time.unwrap();
        assert_eq!(start.timestamp_subsec_micros(), 123_456);
        assert_eq!((end - start).num_seconds(), 25 * 60 + 29);

        let json = r#"[{
            "id": 9,
            "start_time": "2024-05-01T10:00:00",
            "end_time": null,
            "is_completed": false,
            "score": null,
            "total_questions": 10,
            "correct_answers": 0
        }]"#;
        let history: Vec<ExamRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(history[0].start_time.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert!(history[0].end_time.is_none());
    }

    #[test]
    fn registered_user_decodes_naive_timestamp() {
        let json = r#"{"id":3,"email":"ada@example.com","username":"ada","created_at":"2024-05-01T10:00:00.5"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.created_at.timestamp_subsec_millis(), 500);
    }
}
