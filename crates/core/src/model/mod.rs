mod ids;
mod question;
mod result;
mod wire_time;

pub use ids::{ExamId, ParseIdError, QuestionId, UserId};
pub use question::{OptionLabel, OptionLabelError, Question};
pub use result::{AnswerSubmission, ExamRecord, ExamResult, User};
