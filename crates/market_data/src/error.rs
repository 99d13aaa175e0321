use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Binance request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx reply. `details` is the raw body when it was JSON.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        details: Option<Value>,
    },

    #[error("Invalid symbol: {0}")]
    UnknownSymbol(String),

    #[error("Malformed Binance payload: {0}")]
    Malformed(String),
}

impl ExchangeError {
    /// HTTP status reported by Binance, when the failure came from a reply.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExchangeError::Api { status, .. } => Some(*status),
            ExchangeError::Http(e) => e.status().map(|s| s.as_u16()),
            ExchangeError::UnknownSymbol(_) => Some(400),
            ExchangeError::Malformed(_) => None,
        }
    }
}

impl From<ExchangeError> for common::RelayError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Api {
                status,
                message,
                details,
                ..
            } => common::RelayError::Upstream {
                message,
                status: Some(status),
                details,
            },
            ExchangeError::UnknownSymbol(_) => {
                common::RelayError::upstream(err.to_string(), Some(400))
            }
            ExchangeError::Http(ref e) => {
                let status = e.status().map(|s| s.as_u16());
                common::RelayError::upstream(err.to_string(), status)
            }
            ExchangeError::Malformed(_) => common::RelayError::upstream(err.to_string(), None),
        }
    }
}
