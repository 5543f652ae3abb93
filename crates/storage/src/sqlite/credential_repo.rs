use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{CredentialStore, StorageError, StoredCredential};

use super::SqliteRepository;

#[async_trait]
impl CredentialStore for SqliteRepository {
    async fn load_credential(&self) -> Result<Option<StoredCredential>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, username, saved_at
            FROM credentials
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let token: String = row
            .try_get("token")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let username: Option<String> = row
            .try_get("username")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let saved_at: DateTime<Utc> = row
            .try_get("saved_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredCredential {
            token,
            username,
            saved_at,
        }))
    }

    async fn save_credential(&self, credential: &StoredCredential) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO credentials (id, token, username, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                username = excluded.username,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(&credential.token)
        .bind(credential.username.as_deref())
        .bind(credential.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_credential(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM credentials WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
