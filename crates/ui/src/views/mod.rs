mod dashboard;
mod exam;
mod login;
mod register;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use dashboard::DashboardView;
pub use exam::ExamView;
pub use login::LoginView;
pub use register::RegisterView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, is_unauthorized, view_state_from_resource};
