use std::fmt;

use chrono::{DateTime, Utc};
use common::config::mask;
use common::models::ApiCredentials;

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Credential {
    pub id: i64,
    pub api_key: String,
    pub api_secret: String,
    pub webhook_token: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn to_api_credentials(&self) -> ApiCredentials {
        ApiCredentials::new(
            self.api_key.clone(),
            self.api_secret.clone(),
            format!("store#{}", self.id),
        )
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .field("webhook_token", &self.webhook_token.as_ref().map(|_| "***"))
            .field("display_name", &self.display_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct NewCredential {
    pub api_key: String,
    pub api_secret: String,
    pub webhook_token: Option<String>,
    pub display_name: Option<String>,
}
