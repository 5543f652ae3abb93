use exam_core::model::{ExamId, ExamRecord};

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRowVm {
    pub id: ExamId,
    pub started_at_str: String,
    pub score: String,
    pub correct: String,
    pub completed: bool,
}

impl From<&ExamRecord> for HistoryRowVm {
    fn from(record: &ExamRecord) -> Self {
        Self {
            id: record.id,
            started_at_str: format_datetime(record.start_time),
            score: record
                .score
                .map_or_else(|| "-".to_owned(), |score| format!("{score}%")),
            correct: format!("{}/{}", record.correct_answers, record.total_questions),
            completed: record.is_completed,
        }
    }
}

#[must_use]
pub fn map_history_rows(records: &[ExamRecord]) -> Vec<HistoryRowVm> {
    records.iter().map(HistoryRowVm::from).collect()
}
