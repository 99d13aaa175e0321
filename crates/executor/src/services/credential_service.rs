use std::sync::Arc;

use common::config::StaticCredentials;
use common::models::ApiCredentials;
use common::{RelayError, Settings};
use market_data::remote::secrets_match;
use storage::CredentialStore;
use tracing::{debug, warn};

/// Maps the token from a webhook path to the key pair used for the order.
///
/// The shared `WEBHOOK_SECRET` selects the configured key pair, or the newest
/// stored one when none is configured. Any other token must match a stored
/// record's webhook token.
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    webhook_secret: Option<String>,
    static_credentials: Option<StaticCredentials>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn CredentialStore>, settings: &Settings) -> Self {
        Self {
            store,
            webhook_secret: settings.webhook_secret.clone(),
            static_credentials: settings.static_credentials.clone(),
        }
    }

    pub async fn resolve(&self, token: &str) -> Result<ApiCredentials, RelayError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(RelayError::Unauthorized);
        }

        let shared = self
            .webhook_secret
            .as_deref()
            .is_some_and(|secret| secrets_match(token, secret));
        if shared {
            if let Some(creds) = &self.static_credentials {
                return Ok(ApiCredentials::new(
                    creds.api_key.clone(),
                    creds.api_secret.clone(),
                    "static",
                ));
            }
            return match self.store.get_latest().await? {
                Some(stored) => Ok(stored.to_api_credentials()),
                None => {
                    warn!("Shared webhook secret matched but no API credentials exist");
                    Err(RelayError::Unconfigured(
                        "Binance API keys not configured.".to_string(),
                    ))
                }
            };
        }

        match self.store.get_by_token(token).await? {
            Some(stored) => {
                debug!(id = stored.id, "Webhook token resolved");
                Ok(stored.to_api_credentials())
            }
            None => Err(RelayError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{CredentialRepository, Database, NewCredential};

    async fn store_with(records: &[(&str, Option<&str>)]) -> Arc<dyn CredentialStore> {
        let repo = CredentialRepository::new(Database::in_memory().await.unwrap());
        for (key, token) in records {
            repo.add(NewCredential {
                api_key: key.to_string(),
                api_secret: format!("{}-secret", key),
                webhook_token: token.map(str::to_string),
                display_name: None,
            })
            .await
            .unwrap();
        }
        Arc::new(repo)
    }

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn shared_secret_selects_static_credentials() {
        let svc = CredentialService::new(
            store_with(&[("stored", Some("tok"))]).await,
            &settings(&[
                ("WEBHOOK_SECRET", "shh"),
                ("BINANCE_API_KEY", "env-key"),
                ("BINANCE_API_SECRET", "env-secret"),
            ]),
        );
        let creds = svc.resolve("shh").await.unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.source, "static");
    }

    #[tokio::test]
    async fn shared_secret_falls_back_to_latest_stored() {
        let svc = CredentialService::new(
            store_with(&[("old", None), ("new", None)]).await,
            &settings(&[("WEBHOOK_SECRET", "shh")]),
        );
        let creds = svc.resolve("shh").await.unwrap();
        assert_eq!(creds.api_key, "new");
        assert_eq!(creds.api_secret, "new-secret");
    }

    #[tokio::test]
    async fn shared_secret_without_any_keys_is_unconfigured() {
        let svc = CredentialService::new(
            store_with(&[]).await,
            &settings(&[("WEBHOOK_SECRET", "shh")]),
        );
        let err = svc.resolve("shh").await.unwrap_err();
        assert!(matches!(err, RelayError::Unconfigured(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn per_credential_token_resolves() {
        let svc = CredentialService::new(
            store_with(&[("a", Some("tok-a")), ("b", Some("tok-b"))]).await,
            &settings(&[]),
        );
        assert_eq!(svc.resolve("tok-a").await.unwrap().api_key, "a");
        assert_eq!(svc.resolve("tok-b").await.unwrap().api_key, "b");
    }

    #[tokio::test]
    async fn unknown_or_empty_token_is_unauthorized() {
        let svc = CredentialService::new(
            store_with(&[("a", Some("tok-a"))]).await,
            &settings(&[("WEBHOOK_SECRET", "shh")]),
        );
        assert!(matches!(
            svc.resolve("nope").await,
            Err(RelayError::Unauthorized)
        ));
        assert!(matches!(svc.resolve(" ").await, Err(RelayError::Unauthorized)));
    }

    #[tokio::test]
    async fn prefix_of_shared_secret_is_not_accepted() {
        let svc = CredentialService::new(
            store_with(&[]).await,
            &settings(&[
                ("WEBHOOK_SECRET", "shh-long"),
                ("BINANCE_API_KEY", "env-key"),
                ("BINANCE_API_SECRET", "env-secret"),
            ]),
        );
        assert!(matches!(svc.resolve("shh").await, Err(RelayError::Unauthorized)));
        assert!(matches!(
            svc.resolve("shh-long!").await,
            Err(RelayError::Unauthorized)
        ));
        assert_eq!(svc.resolve("shh-long").await.unwrap().source, "static");
    }
}
