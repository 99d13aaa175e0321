use async_trait::async_trait;
use common::models::{ApiCredentials, Side, SymbolInfo};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ExchangeError;

/// Wire payloads that convert into a domain model.
pub trait RemoteResponse<T> {
    fn to_model(&self) -> Result<T, ExchangeError>;
}

/// The exchange calls the order pipeline depends on. Each method is exactly one
/// outbound request.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn symbol_info(&self, ticker: &str) -> Result<SymbolInfo, ExchangeError>;

    async fn current_price(&self, ticker: &str) -> Result<Decimal, ExchangeError>;

    /// Free balance of `asset`; zero when the account holds none.
    async fn account_balance(
        &self,
        credentials: &ApiCredentials,
        asset: &str,
    ) -> Result<Decimal, ExchangeError>;

    /// Submits a signed MARKET order and returns Binance's raw acknowledgement.
    async fn place_market_order(
        &self,
        credentials: &ApiCredentials,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<Value, ExchangeError>;
}
