use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading constraints of a pair, fetched fresh for every signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    /// `LOT_SIZE` step: order quantities must be a multiple of it.
    pub step_size: Decimal,
}
