pub mod credentials;
pub mod order_result;
pub mod signal;
pub mod symbol;

pub use credentials::ApiCredentials;
pub use order_result::{OrderResult, ResultStatus};
pub use signal::{Side, TradeSignal};
pub use symbol::SymbolInfo;
