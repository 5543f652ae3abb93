#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CredentialStore, InMemoryRepository, Storage, StorageError, StoredCredential};
pub use sqlite::{SqliteInitError, SqliteRepository};
