use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{Credential, NewCredential};

/// Keyed credential records. Every call is atomic on its own; callers never
/// observe a half-written record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_by_token(&self, token: &str) -> Result<Option<Credential>, StorageError>;

    /// Most recently added record.
    async fn get_latest(&self) -> Result<Option<Credential>, StorageError>;

    /// Returns the new record's id.
    async fn add(&self, new: NewCredential) -> Result<i64, StorageError>;

    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Credential>, StorageError>;

    /// Returns the number of deleted rows (0 or 1).
    async fn delete_by_id(&self, id: i64) -> Result<u64, StorageError>;
}
