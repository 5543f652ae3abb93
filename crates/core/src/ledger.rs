//! In-memory record of the candidate's current selections.

use std::collections::HashMap;

use crate::model::{AnswerSubmission, OptionLabel, Question, QuestionId};

/// Maps question ids to the selected option.
///
/// The ledger is deliberately decoupled from question loading: it accepts any
/// `QuestionId`, including ids that are not part of the session. Such entries
/// are kept as-is and only matter if a question with that id exists when the
/// submission payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    entries: HashMap<QuestionId, OptionLabel>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `option` for `question_id`, replacing any previous selection.
    pub fn set(&mut self, question_id: QuestionId, option: OptionLabel) {
        self.entries.insert(question_id, option);
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.entries.get(&question_id).copied()
    }

    /// Forget the selection for `question_id`. Returns the previous value.
    pub fn clear(&mut self, question_id: QuestionId) -> Option<OptionLabel> {
        self.entries.remove(&question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, OptionLabel)> + '_ {
        self.entries.iter().map(|(id, label)| (*id, *label))
    }

    /// Build the grading payload in question order.
    ///
    /// Every question appears exactly once; unanswered ones carry an empty
    /// selection. Dangling entries are not included.
    #[must_use]
    pub fn to_submissions(&self, questions: &[Question]) -> Vec<AnswerSubmission> {
        questions
            .iter()
            .map(|question| AnswerSubmission::new(question.id(), self.get(question.id())))
            .collect()
    }
}
