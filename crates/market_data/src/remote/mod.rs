pub mod account_response;
pub mod binance_client;
pub mod exchange_info_response;
pub mod signer;
pub mod ticker_price_response;

pub use account_response::{AccountInformation, Balance};
pub use binance_client::BinanceClient;
pub use exchange_info_response::ExchangeInfoResponse;
pub use signer::{QueryParams, RequestSigner, SignedRequest, secrets_match, sign_payload};
pub use ticker_price_response::TickerPriceResponse;
