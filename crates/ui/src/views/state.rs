use dioxus::prelude::*;
use services::ApiError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The credential is gone; the view should send the user to login.
    Unauthorized,
    Message(String),
}

impl ViewError {
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized
        } else {
            Self::Message(err.user_message(fallback))
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized => "Your session has expired. Please log in again.",
            Self::Message(message) => message,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Loading,
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Whether a finished resource failed because the credential was rejected.
#[must_use]
pub fn is_unauthorized<T>(resource: Resource<Result<T, ViewError>>) -> bool {
    matches!(
        resource.value().read().as_ref(),
        Some(Err(ViewError::Unauthorized))
    )
}
