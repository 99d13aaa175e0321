use serde_json::Value;
use thiserror::Error;

/// Everything a webhook call can fail with. Each variant maps to one HTTP
/// status; nothing is retried.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Unconfigured(String),

    #[error("Invalid action '{0}', expected BUY or SELL")]
    InvalidAction(String),

    #[error("Insufficient {asset} balance to place an order")]
    InsufficientBalance { asset: String },

    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
        details: Option<Value>,
    },

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::BadRequest(_)
            | RelayError::InvalidAction(_)
            | RelayError::InsufficientBalance { .. } => 400,
            RelayError::Unauthorized => 401,
            RelayError::Unconfigured(_) | RelayError::Internal(_) => 500,
            RelayError::Upstream { status, .. } => match status {
                Some(s) if (400..600).contains(s) => *s,
                _ => 500,
            },
        }
    }

    /// Message placed in the response body. Internal errors may carry text from
    /// arbitrary sources, so control characters are stripped.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Internal(msg) => {
                let clean = sanitize_message(msg);
                if clean.is_empty() {
                    "Internal server error".to_string()
                } else {
                    clean
                }
            }
            other => other.to_string(),
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            RelayError::Upstream { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn upstream(message: impl Into<String>, status: Option<u16>) -> Self {
        RelayError::Upstream {
            message: message.into(),
            status,
            details: None,
        }
    }
}

/// Drops C0 and C1 control characters (`\u{0}`-`\u{1F}`, `\u{7F}`-`\u{9F}`).
pub fn sanitize_message(msg: &str) -> String {
    msg.chars()
        .filter(|c| !matches!(*c, '\u{0}'..='\u{1F}' | '\u{7F}'..='\u{9F}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(RelayError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(RelayError::Unauthorized.status_code(), 401);
        assert_eq!(RelayError::Unconfigured("x".into()).status_code(), 500);
        assert_eq!(RelayError::InvalidAction("HOLD".into()).status_code(), 400);
        assert_eq!(
            RelayError::InsufficientBalance {
                asset: "BTC".into()
            }
            .status_code(),
            400
        );
        assert_eq!(RelayError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn upstream_status_is_mirrored_when_valid() {
        assert_eq!(RelayError::upstream("bad", Some(418)).status_code(), 418);
        assert_eq!(RelayError::upstream("bad", Some(200)).status_code(), 500);
        assert_eq!(RelayError::upstream("bad", None).status_code(), 500);
    }

    #[test]
    fn internal_message_is_sanitized() {
        let err = RelayError::Internal("line\nbreak\u{7}\u{85}done".into());
        assert_eq!(err.public_message(), "linebreakdone");
        assert_eq!(
            RelayError::Internal("\n\t".into()).public_message(),
            "Internal server error"
        );
    }

    #[test]
    fn sanitize_keeps_printable_unicode() {
        assert_eq!(sanitize_message("prix: 5€"), "prix: 5€");
    }
}
