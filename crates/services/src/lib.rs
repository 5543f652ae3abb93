#![forbid(unsafe_code)]

pub mod api_client;
pub mod auth_service;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exam_service;
pub mod ports;
pub mod sessions;

pub use api_client::{ApiClient, TokenResponse};
pub use auth_service::{
    AuthService, LOGIN_FAILED_MESSAGE, LoginForm, REGISTER_FAILED_MESSAGE, RegisterForm,
};
pub use config::{ApiConfig, DEFAULT_API_URL, ExamConfig};
pub use credentials::{AuthToken, CredentialContext};
pub use error::{ApiError, AuthError};
pub use exam_service::{ExamService, START_FAILED_MESSAGE};
pub use ports::{ExamArchive, ExamGrader, QuestionSource};
pub use sessions::{SUBMIT_FAILED_MESSAGE, SessionCommand, SessionDriver, SessionHandle};
pub use exam_core::Clock;
