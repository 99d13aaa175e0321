pub mod config;
pub mod error;
pub mod logger;
pub mod models;

pub use config::Settings;
pub use error::RelayError;
