use async_trait::async_trait;
use common::Settings;
use common::models::{ApiCredentials, Side, SymbolInfo};
use market_data::{ExchangeApi, ExchangeError};
use mockall::mock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

mock! {
    pub Exchange {}

    #[async_trait]
    impl ExchangeApi for Exchange {
        async fn symbol_info(&self, ticker: &str) -> Result<SymbolInfo, ExchangeError>;
        async fn current_price(&self, ticker: &str) -> Result<Decimal, ExchangeError>;
        async fn account_balance(
            &self,
            credentials: &ApiCredentials,
            asset: &str,
        ) -> Result<Decimal, ExchangeError>;
        async fn place_market_order(
            &self,
            credentials: &ApiCredentials,
            symbol: &str,
            side: Side,
            quantity: Decimal,
        ) -> Result<Value, ExchangeError>;
    }
}

impl MockExchange {
    /// A mock that panics on any call.
    pub fn untouched() -> Self {
        let mut mock = MockExchange::new();
        mock.expect_symbol_info().never();
        mock.expect_current_price().never();
        mock.expect_account_balance().never();
        mock.expect_place_market_order().never();
        mock
    }
}

pub const WEBHOOK_SECRET: &str = "hook-secret";
pub const ADMIN_TOKEN: &str = "admin-token";

/// Settings with a shared webhook secret, static keys and an admin token.
pub fn test_settings() -> Settings {
    Settings::from_lookup(|key| {
        match key {
            "WEBHOOK_SECRET" => Some(WEBHOOK_SECRET),
            "BINANCE_API_KEY" => Some("static-key"),
            "BINANCE_API_SECRET" => Some("static-secret"),
            "ADMIN_TOKEN" => Some(ADMIN_TOKEN),
            "REQUEST_DEADLINE_MS" => Some("2000"),
            _ => None,
        }
        .map(str::to_string)
    })
    .expect("test settings are valid")
}

pub fn btcusdt(step: Decimal) -> SymbolInfo {
    SymbolInfo {
        symbol: "BTCUSDT".into(),
        base_asset: "BTC".into(),
        quote_asset: "USDT".into(),
        step_size: step,
    }
}

pub fn default_step() -> Decimal {
    dec!(0.01)
}
