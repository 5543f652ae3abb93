//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by the HTTP transport and the services built on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered 401. The stored credential has been cleared.
    #[error("not authenticated")]
    Unauthorized { detail: Option<String> },

    #[error("request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Server-provided explanation, if the response carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user: the server's `detail` verbatim, or `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_owned()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::Api(ApiError::Storage(err))
    }
}

impl AuthError {
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::MissingField(_) => self.to_string(),
            Self::Api(err) => err.user_message(fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let err = ApiError::Rejected {
            status: 400,
            detail: Some("You already have an active exam".into()),
        };
        assert_eq!(err.user_message("fallback"), "You already have an active exam");

        let bare = ApiError::Rejected {
            status: 500,
            detail: None,
        };
        assert_eq!(bare.user_message("Failed to submit exam"), "Failed to submit exam");
    }

    #[test]
    fn missing_field_message_names_the_field() {
        let err = AuthError::MissingField("username");
        assert_eq!(err.user_message("ignored"), "username is required");
    }
}
