use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
/// Binance rejects any `recvWindow` above one minute.
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Static exchange credentials configured through the environment.
#[derive(Clone)]
pub struct StaticCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &"***")
            .finish()
    }
}

/// Process configuration, read once at start-up and shared by `Arc`.
#[derive(Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub binance_base_url: String,
    pub static_credentials: Option<StaticCredentials>,
    pub webhook_secret: Option<String>,
    pub admin_token: Option<String>,
    pub database_path: String,
    pub recv_window_ms: u64,
    pub http_timeout: Duration,
    pub request_deadline: Duration,
    pub idempotency_window: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("binance_base_url", &self.binance_base_url)
            .field("static_credentials", &self.static_credentials)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "***"))
            .field("database_path", &self.database_path)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("http_timeout", &self.http_timeout)
            .field("request_deadline", &self.request_deadline)
            .field("idempotency_window", &self.idempotency_window)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or("PORT", get("PORT"), 3000)?;
        let bind_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let static_credentials = match (get("BINANCE_API_KEY"), get("BINANCE_API_SECRET")) {
            (Some(api_key), Some(api_secret)) => Some(StaticCredentials {
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let recv_window_ms: u64 = parse_or("RECV_WINDOW_MS", get("RECV_WINDOW_MS"), 5_000)?;
        if recv_window_ms == 0 || recv_window_ms > MAX_RECV_WINDOW_MS {
            return Err(ConfigError::Invalid {
                key: "RECV_WINDOW_MS",
                reason: format!("must be within 1..={}", MAX_RECV_WINDOW_MS),
            });
        }

        let http_timeout_ms: u64 = parse_or("HTTP_TIMEOUT_MS", get("HTTP_TIMEOUT_MS"), 10_000)?;
        let deadline_ms: u64 =
            parse_or("REQUEST_DEADLINE_MS", get("REQUEST_DEADLINE_MS"), 15_000)?;
        let window_secs: u64 =
            parse_or("IDEMPOTENCY_WINDOW_SECS", get("IDEMPOTENCY_WINDOW_SECS"), 300)?;

        Ok(Self {
            bind_addr,
            binance_base_url: get("BINANCE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            static_credentials,
            webhook_secret: get("WEBHOOK_SECRET"),
            admin_token: get("ADMIN_TOKEN"),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "credentials.db".to_string()),
            recv_window_ms,
            http_timeout: Duration::from_millis(http_timeout_ms),
            request_deadline: Duration::from_millis(deadline_ms),
            idempotency_window: Duration::from_secs(window_secs),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("'{}': {}", v, e),
        }),
    }
}

/// Short preview of a key for logs: first four characters only.
pub fn mask(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    format!("{}***", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.binance_base_url, DEFAULT_BASE_URL);
        assert_eq!(s.recv_window_ms, 5_000);
        assert!(s.static_credentials.is_none());
        assert!(s.webhook_secret.is_none());
        assert_eq!(s.request_deadline, Duration::from_millis(15_000));
        assert_eq!(s.idempotency_window, Duration::from_secs(300));
    }

    #[test]
    fn static_credentials_need_both_halves() {
        let s = settings(&[("BINANCE_API_KEY", "key")]).unwrap();
        assert!(s.static_credentials.is_none());

        let s = settings(&[("BINANCE_API_KEY", "key"), ("BINANCE_API_SECRET", "secret")]).unwrap();
        let creds = s.static_credentials.unwrap();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret, "secret");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let s = settings(&[("WEBHOOK_SECRET", "  "), ("PORT", "")]).unwrap();
        assert!(s.webhook_secret.is_none());
        assert_eq!(s.bind_addr.port(), 3000);
    }

    #[test]
    fn recv_window_is_bounded() {
        assert!(settings(&[("RECV_WINDOW_MS", "0")]).is_err());
        assert!(settings(&[("RECV_WINDOW_MS", "60001")]).is_err());
        assert_eq!(
            settings(&[("RECV_WINDOW_MS", "10000")]).unwrap().recv_window_ms,
            10_000
        );
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = settings(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let s = settings(&[
            ("BINANCE_API_KEY", "abcdefgh"),
            ("BINANCE_API_SECRET", "topsecret"),
            ("ADMIN_TOKEN", "admintoken"),
        ])
        .unwrap();
        let out = format!("{:?}", s);
        assert!(!out.contains("topsecret"));
        assert!(!out.contains("admintoken"));
        assert!(!out.contains("abcdefgh"));
        assert!(out.contains("abcd***"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let s = settings(&[("BINANCE_BASE_URL", "https://testnet.binance.vision/")]).unwrap();
        assert_eq!(s.binance_base_url, "https://testnet.binance.vision");
    }
}
