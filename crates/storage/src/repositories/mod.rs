pub mod credentials_repo;

pub use credentials_repo::CredentialRepository;
