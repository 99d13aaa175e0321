use common::models::SymbolInfo;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Deserialize, Debug)]
pub struct ExchangeInfoResponse {
    #[serde(default)]
    pub symbols: Vec<SymbolEntry>,
}

#[derive(Deserialize, Debug)]
pub struct SymbolEntry {
    pub symbol: String,
    #[serde(rename(deserialize = "baseAsset"))]
    pub base_asset: String,
    #[serde(rename(deserialize = "quoteAsset"))]
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Deserialize, Debug)]
pub struct SymbolFilter {
    #[serde(rename(deserialize = "filterType"))]
    pub filter_type: String,
    #[serde(rename(deserialize = "stepSize"), default)]
    pub step_size: Option<Decimal>,
}

impl ExchangeInfoResponse {
    /// Binance answers an unknown symbol either with a 400 or an empty list.
    pub fn find(&self, ticker: &str) -> Result<&SymbolEntry, ExchangeError> {
        self.symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| ExchangeError::UnknownSymbol(ticker.to_string()))
    }
}

impl RemoteResponse<SymbolInfo> for SymbolEntry {
    fn to_model(&self) -> Result<SymbolInfo, ExchangeError> {
        let step_size = self
            .filters
            .iter()
            .find(|f| f.filter_type == "LOT_SIZE")
            .and_then(|f| f.step_size)
            .ok_or_else(|| {
                ExchangeError::Malformed(format!("{} has no LOT_SIZE stepSize", self.symbol))
            })?;

        Ok(SymbolInfo {
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            step_size: step_size.normalize(),
        })
    }
}
