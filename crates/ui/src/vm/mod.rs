mod exam_vm;
mod history_vm;
mod result_vm;
mod time_fmt;

pub use exam_vm::{ExamVm, OptionVm, percent_complete};
pub use history_vm::{HistoryRowVm, map_history_rows};
pub use result_vm::{ResultVm, ScoreBand};
