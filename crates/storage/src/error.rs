use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("webhook token is already assigned to another credential")]
    DuplicateToken,

    #[error("{0}")]
    Invalid(String),
}

impl From<StorageError> for common::RelayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateToken | StorageError::Invalid(_) => {
                common::RelayError::BadRequest(err.to_string())
            }
            StorageError::Database(_) => common::RelayError::Internal(err.to_string()),
        }
    }
}
