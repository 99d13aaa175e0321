use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AccountInformation {
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(rename = "canTrade", default)]
    pub can_trade: bool,
}

impl AccountInformation {
    /// Free amount of `asset`. An asset missing from the list is a zero
    /// holding, not an error.
    pub fn free_balance(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_free_balance_and_defaults_to_zero() {
        let info: AccountInformation = serde_json::from_str(
            r#"{"canTrade": true, "balances": [
                {"asset": "BTC", "free": "0.00120000", "locked": "0.50000000"},
                {"asset": "USDT", "free": "100.00000000", "locked": "0.00000000"}
            ]}"#,
        )
        .unwrap();
        assert!(info.can_trade);
        assert_eq!(info.free_balance("BTC"), dec!(0.0012));
        assert_eq!(info.free_balance("USDT"), dec!(100));
        assert_eq!(info.free_balance("ETH"), Decimal::ZERO);
    }
}
