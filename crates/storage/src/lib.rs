pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod traits;

pub use db::Database;
pub use error::StorageError;
pub use models::{Credential, NewCredential};
pub use repositories::CredentialRepository;
pub use traits::CredentialStore;
