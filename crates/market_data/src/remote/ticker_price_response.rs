use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Deserialize, Debug)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: Decimal,
}

impl RemoteResponse<Decimal> for TickerPriceResponse {
    fn to_model(&self) -> Result<Decimal, ExchangeError> {
        if self.price <= Decimal::ZERO {
            return Err(ExchangeError::Malformed(format!(
                "non-positive price {} for {}",
                self.price, self.symbol
            )));
        }
        Ok(self.price)
    }
}
