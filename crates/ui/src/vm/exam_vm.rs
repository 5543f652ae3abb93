use exam_core::model::OptionLabel;
use exam_core::{SessionSnapshot, SessionStatus, format_remaining};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: OptionLabel,
    pub text: String,
    pub selected: bool,
}

/// Everything the exam screen renders, derived from one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamVm {
    pub status: SessionStatus,
    pub position: String,
    pub heading: String,
    pub question_text: String,
    pub options: Vec<OptionVm>,
    pub timer: String,
    pub timer_low: bool,
    pub progress: String,
    pub percent_complete: u32,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub show_controls: bool,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
    pub message: Option<String>,
}

impl From<&SessionSnapshot> for ExamVm {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let status = snapshot.status;
        let number = snapshot.current_index + 1;
        let options = snapshot
            .current_question
            .as_ref()
            .map(|question| {
                question
                    .options()
                    .map(|(label, text)| OptionVm {
                        label,
                        text: text.to_owned(),
                        selected: snapshot.current_selection == Some(label),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let interactive = status == SessionStatus::Active;

        Self {
            status,
            position: format!("Question {number} of {}", snapshot.total),
            heading: format!("Question {number}"),
            question_text: snapshot
                .current_question
                .as_ref()
                .map(|question| question.text().to_owned())
                .unwrap_or_default(),
            options,
            timer: format_remaining(snapshot.remaining_secs),
            timer_low: snapshot.low_time,
            progress: format!("Progress: {}/{} answered", snapshot.answered, snapshot.total),
            percent_complete: percent_complete(snapshot.answered, snapshot.total),
            can_go_previous: interactive && !snapshot.is_first(),
            can_go_next: interactive && !snapshot.is_last(),
            show_controls: matches!(
                status,
                SessionStatus::Active | SessionStatus::Submitting | SessionStatus::Failed
            ),
            submit_label: if status == SessionStatus::Submitting {
                "Submitting..."
            } else {
                "Submit Exam"
            },
            submit_disabled: !matches!(status, SessionStatus::Active | SessionStatus::Failed),
            message: snapshot.message.clone(),
        }
    }
}

#[must_use]
pub fn percent_complete(answered: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (answered.min(total) * 200 + total) / (total * 2);
    u32::try_from(percent).unwrap_or(100)
}
