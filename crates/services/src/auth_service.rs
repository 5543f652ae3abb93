use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use exam_core::model::User;

use crate::api_client::ApiClient;
use crate::credentials::{AuthToken, CredentialContext};
use crate::error::{AuthError, ApiError};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
pub const REGISTER_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for the first blank field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        Ok(())
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for the first blank field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if self.username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        Ok(())
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Login, registration and logout on top of the shared credential.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialContext> {
        self.api.credentials()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_authenticated()
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.credentials().username()
    }

    /// Exchange the form for a token and make it the active credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for an incomplete form and
    /// `AuthError::Api` if the server refuses the login or the credential
    /// cannot be stored.
    pub async fn login(&self, form: &LoginForm) -> Result<(), AuthError> {
        form.validate()?;
        let token = self.api.login(form).await?;
        self.credentials()
            .establish(
                AuthToken::new(token.access_token),
                Some(form.username.trim().to_owned()),
            )
            .await?;
        info!(username = %form.username.trim(), "logged in");
        Ok(())
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for an incomplete form and
    /// `AuthError::Api` if the server rejects the registration.
    pub async fn register(&self, form: &RegisterForm) -> Result<User, AuthError> {
        form.validate()?;
        let user = self.api.register(form).await?;
        info!(user_id = %user.id, "registered");
        Ok(user)
    }

    /// Drop the active credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the stored credential cannot be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.credentials().clear().await?;
        Ok(())
    }

    /// Reload the credential saved by a previous run.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub async fn restore(&self) -> Result<bool, ApiError> {
        Ok(self.credentials().restore().await?)
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
