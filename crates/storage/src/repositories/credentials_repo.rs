use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::StorageError;
use crate::models::{Credential, NewCredential};
use crate::traits::CredentialStore;

const COLUMNS: &str =
    "id, api_key, api_secret, webhook_token, display_name, created_at, updated_at";

#[derive(Clone)]
pub struct CredentialRepository {
    db: Database,
}

impl CredentialRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn get_by_token(&self, token: &str) -> Result<Option<Credential>, StorageError> {
        let credential = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {} FROM credentials WHERE webhook_token = ?",
            COLUMNS
        ))
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(credential)
    }

    async fn get_latest(&self) -> Result<Option<Credential>, StorageError> {
        let credential = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {} FROM credentials ORDER BY id DESC LIMIT 1",
            COLUMNS
        ))
        .fetch_optional(self.db.pool())
        .await?;
        Ok(credential)
    }

    async fn add(&self, new: NewCredential) -> Result<i64, StorageError> {
        let api_key = new.api_key.trim();
        let api_secret = new.api_secret.trim();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(StorageError::Invalid(
                "apiKey and apiSecret are required".to_string(),
            ));
        }
        let token = new
            .webhook_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
                INSERT INTO credentials (
                    api_key, api_secret, webhook_token, display_name, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                RETURNING id
            "#,
        )
        .bind(api_key)
        .bind(api_secret)
        .bind(token)
        .bind(new.display_name.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StorageError::DuplicateToken);
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        info!(id, "Credential added");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Credential>, StorageError> {
        let credentials = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {} FROM credentials ORDER BY id DESC",
            COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(credentials)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM credentials WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        let changes = result.rows_affected();
        debug!(id, changes, "Credential delete");
        Ok(changes)
    }
}
