use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Inbound webhook payload. Older senders use `symbol`/`side` and pass an
/// explicit `quantity`; newer ones send `ticker`/`action` and let the relay
/// size the order from the account balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeSignal {
    #[serde(alias = "symbol")]
    pub ticker: Option<String>,
    #[serde(alias = "side")]
    pub action: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default, rename = "idempotencyKey", alias = "idempotency_key")]
    pub idempotency_key: Option<String>,
}

impl TradeSignal {
    /// Trimmed, upper-cased ticker, or `BadRequest` when missing. The ticker
    /// ends up verbatim in a signed query string, so only ASCII alphanumerics
    /// are accepted.
    pub fn require_ticker(&self) -> Result<String, RelayError> {
        match self.ticker.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => {
                if t.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(t.to_ascii_uppercase())
                } else {
                    Err(RelayError::BadRequest(format!("Invalid ticker '{}'", t)))
                }
            }
            _ => Err(RelayError::BadRequest(
                "Missing required field: ticker".to_string(),
            )),
        }
    }

    pub fn require_side(&self) -> Result<Side, RelayError> {
        match self.action.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => a.parse(),
            _ => Err(RelayError::BadRequest(
                "Missing required field: action".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BUY") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("SELL") {
            Ok(Side::Sell)
        } else {
            Err(RelayError::InvalidAction(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SeLL".parse::<Side>().unwrap(), Side::Sell);
    }

    #[test]
    fn unknown_action_is_invalid_action() {
        let err = "HOLD".parse::<Side>().unwrap_err();
        assert!(matches!(err, RelayError::InvalidAction(ref a) if a == "HOLD"));
    }

    #[test]
    fn accepts_legacy_field_names() {
        let signal: TradeSignal =
            serde_json::from_str(r#"{"symbol":"btcusdt","side":"BUY","quantity":0.5}"#).unwrap();
        assert_eq!(signal.require_ticker().unwrap(), "BTCUSDT");
        assert_eq!(signal.require_side().unwrap(), Side::Buy);
        assert_eq!(signal.quantity, Some(dec!(0.5)));
    }

    #[test]
    fn accepts_ticker_and_action() {
        let signal: TradeSignal =
            serde_json::from_str(r#"{"ticker":"ETHUSDT","action":"sell","idempotencyKey":"k1"}"#)
                .unwrap();
        assert_eq!(signal.require_side().unwrap(), Side::Sell);
        assert_eq!(signal.quantity, None);
        assert_eq!(signal.idempotency_key.as_deref(), Some("k1"));
    }

    #[test]
    fn missing_fields_are_bad_requests() {
        let signal = TradeSignal::default();
        assert!(matches!(
            signal.require_ticker(),
            Err(RelayError::BadRequest(_))
        ));
        assert!(matches!(signal.require_side(), Err(RelayError::BadRequest(_))));
    }

    #[test]
    fn ticker_with_query_characters_is_rejected() {
        let signal = TradeSignal {
            ticker: Some("BTCUSDT&side=SELL".into()),
            ..Default::default()
        };
        assert!(matches!(
            signal.require_ticker(),
            Err(RelayError::BadRequest(_))
        ));
    }
}
