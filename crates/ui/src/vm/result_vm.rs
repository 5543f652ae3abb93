use exam_core::model::ExamResult;

use crate::vm::time_fmt::{format_datetime, minutes_between};

/// Score band used for colour and wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
}

impl ScoreBand {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Excellent
        } else if percentage >= 60.0 {
            Self::Good
        } else {
            Self::NeedsWork
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent! Great job!",
            Self::Good => "Good work! Keep practicing.",
            Self::NeedsWork => "Keep studying and try again!",
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Excellent => "score-excellent",
            Self::Good => "score-good",
            Self::NeedsWork => "score-low",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultVm {
    pub percentage: String,
    pub bar_width: f64,
    pub band: ScoreBand,
    pub summary: String,
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub started_at_str: Option<String>,
    pub finished_at_str: Option<String>,
    pub minutes_taken: Option<i64>,
}

impl From<&ExamResult> for ResultVm {
    fn from(result: &ExamResult) -> Self {
        Self {
            percentage: format!("{}%", result.percentage),
            bar_width: result.percentage.clamp(0.0, 100.0),
            band: ScoreBand::from_percentage(result.percentage),
            summary: format!(
                "Score: {} out of {} correct",
                result.correct_answers, result.total_questions
            ),
            total: result.total_questions,
            correct: result.correct_answers,
            incorrect: result.incorrect_answers(),
            started_at_str: result.start_time.map(format_datetime),
            finished_at_str: result.end_time.map(format_datetime),
            minutes_taken: result
                .start_time
                .zip(result.end_time)
                .map(|(start, end)| minutes_between(start, end)),
        }
    }
}
