use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use exam_core::Clock;
use storage::repository::{CredentialStore, StorageError, StoredCredential};
use tracing::{debug, info};

/// Opaque bearer token issued by the exam server.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Clone, Debug)]
struct Current {
    token: AuthToken,
    username: Option<String>,
}

/// Process-wide login state, shared by the transport and the UI.
///
/// Established on login, torn down on logout or on any 401 response.
/// Every change is mirrored to the `CredentialStore` so a restart can
/// `restore` it.
pub struct CredentialContext {
    current: RwLock<Option<Current>>,
    store: Arc<dyn CredentialStore>,
    clock: Clock,
}

impl CredentialContext {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            current: RwLock::new(None),
            store,
            clock: Clock::default_clock(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Load a previously persisted credential. Returns whether one was found.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn restore(&self) -> Result<bool, StorageError> {
        let stored = self.store.load_credential().await?;
        let found = stored.is_some();
        self.replace(stored.map(|credential| Current {
            token: AuthToken::new(credential.token),
            username: credential.username,
        }));
        debug!(found, "restored credential");
        Ok(found)
    }

    /// Install `token` as the active credential and persist it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be persisted. The
    /// in-memory credential is installed regardless.
    pub async fn establish(
        &self,
        token: AuthToken,
        username: Option<String>,
    ) -> Result<(), StorageError> {
        let stored = StoredCredential::new(token.expose(), username.clone(), self.clock.now());
        self.replace(Some(Current { token, username }));
        info!("credential established");
        self.store.save_credential(&stored).await
    }

    /// Drop the active credential and remove it from the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared. The in-memory
    /// credential is dropped regardless.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.replace(None);
        info!("credential cleared");
        self.store.clear_credential().await
    }

    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.read(|current| current.map(|c| c.token.clone()))
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.read(|current| current.and_then(|c| c.username.clone()))
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|current| current.is_some())
    }

    fn read<T>(&self, f: impl FnOnce(Option<&Current>) -> T) -> T {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    fn replace(&self, value: Option<Current>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
