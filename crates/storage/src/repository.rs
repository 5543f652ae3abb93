use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted login credential.
///
/// The token is opaque to the client; it is only attached to outbound
/// requests. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub token: String,
    pub username: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredential {
    #[must_use]
    pub fn new(token: impl Into<String>, username: Option<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            username,
            saved_at,
        }
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("token", &"***")
            .field("username", &self.username)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Repository contract for the single login credential of this client.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError>;

    /// Persist `credential`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the credential cannot be stored.
    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError>;

    /// Remove the stored credential. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_credential(&self) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    credential: Arc<Mutex<Option<StoredCredential>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryRepository {
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError> {
        let guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(credential.clone());
        Ok(())
    }

    async fn clear_credential(&self) -> Result<(), StorageError> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub credentials: Arc<dyn CredentialStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryRepository::new());
        Self { credentials }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    #[tokio::test]
    async fn save_load_clear_cycle() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_credential().await.unwrap().is_none());

        let credential = StoredCredential::new("tok-1", Some("ada".into()), fixed_now());
        repo.save_credential(&credential).await.unwrap();
        assert_eq!(repo.load_credential().await.unwrap(), Some(credential));

        repo.clear_credential().await.unwrap();
        assert!(repo.load_credential().await.unwrap().is_none());
        repo.clear_credential().await.unwrap();
    }

    #[tokio::test]
    async fn save_replaces_previous_credential() {
        let repo = InMemoryRepository::new();
        repo.save_credential(&StoredCredential::new("old", None, fixed_now()))
            .await
            .unwrap();
        repo.save_credential(&StoredCredential::new("new", None, fixed_now()))
            .await
            .unwrap();
        let loaded = repo.load_credential().await.unwrap().unwrap();
        assert_eq!(loaded.token, "new");
    }

    #[test]
    fn debug_masks_token() {
        let credential = StoredCredential::new("secret-token", None, fixed_now());
        let printed = format!("{credential:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("***"));
    }
}
