use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionId;

/// Label of one of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// All labels in display order.
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Position of this label inside a question's option array.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option label: {raw}")]
pub struct OptionLabelError {
    raw: String,
}

impl FromStr for OptionLabel {
    type Err = OptionLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(OptionLabelError {
                raw: other.to_owned(),
            }),
        }
    }
}

/// A multiple-choice question as delivered by the exam server.
///
/// Immutable once loaded; the correct answer never reaches the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "question_text")]
    text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    #[serde(default, deserialize_with = "crate::model::wire_time::deserialize_option")]
    created_at: Option<DateTime<Utc>>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, options: [String; 4]) -> Self {
        let [option_a, option_b, option_c, option_d] = options;
        Self {
            id,
            text: text.into(),
            option_a,
            option_b,
            option_c,
            option_d,
            created_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn option(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.option_a,
            OptionLabel::B => &self.option_b,
            OptionLabel::C => &self.option_c,
            OptionLabel::D => &self.option_d,
        }
    }

    /// Options paired with their labels, in A–D order.
    pub fn options(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL
            .into_iter()
            .map(move |label| (label, self.option(label)))
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
