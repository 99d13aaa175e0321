pub mod credential_service;
pub mod dedup_service;
pub mod dispatch_service;
pub mod quantity_service;

pub use credential_service::CredentialService;
pub use dedup_service::DedupWindow;
pub use dispatch_service::DispatchService;
