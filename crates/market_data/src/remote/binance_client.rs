use std::time::Duration;

use async_trait::async_trait;
use common::Settings;
use common::models::{ApiCredentials, Side, SymbolInfo};
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ExchangeError;
use crate::remote::account_response::AccountInformation;
use crate::remote::exchange_info_response::ExchangeInfoResponse;
use crate::remote::signer::{QueryParams, RequestSigner};
use crate::remote::ticker_price_response::TickerPriceResponse;
use crate::traits::{ExchangeApi, RemoteResponse};

const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
const TICKER_PRICE: &str = "/api/v3/ticker/price";
const ACCOUNT: &str = "/api/v3/account";
const ORDER: &str = "/api/v3/order";

/// Binance spot REST client. Holds no account state: credentials are passed
/// per call, so one instance serves every webhook.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    signer: RequestSigner,
}

impl BinanceClient {
    pub fn new(
        base_url: impl Into<String>,
        recv_window_ms: u64,
        timeout: Duration,
    ) -> Result<Self, ExchangeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            signer: RequestSigner::new(recv_window_ms),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ExchangeError> {
        Self::new(
            settings.binance_base_url.clone(),
            settings.recv_window_ms,
            settings.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        symbol: &str,
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = path, symbol, "Binance GET request");

        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        decode(path, resp).await
    }

    /// Signs right before sending, so the timestamp is never older than the
    /// time it takes to hash and dispatch.
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        credentials: &ApiCredentials,
        params: QueryParams,
    ) -> Result<T, ExchangeError> {
        let signed = self.signer.sign(&credentials.api_secret, params);
        let url = format!("{}{}?{}", self.base_url, path, signed.full_query());

        debug!(
            endpoint = path,
            %method,
            timestamp = signed.timestamp,
            expires_at = signed.expires_at(),
            "Binance signed request"
        );

        let resp = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;

        decode(path, resp).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, ExchangeError> {
    let status = resp.status();
    let body = resp.text().await?;

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) if status.is_success() => {
            return Err(ExchangeError::Malformed(format!(
                "{} returned a non-JSON body",
                endpoint
            )));
        }
        Err(_) => {
            error!(endpoint, status = status.as_u16(), "Non-JSON response from Binance: {}", body);
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                code: None,
                message: "Invalid response from Binance API".to_string(),
                details: None,
            });
        }
    };

    if !status.is_success() {
        let message = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("Binance API error")
            .to_string();
        let code = value.get("code").and_then(Value::as_i64);
        error!(endpoint, status = status.as_u16(), ?code, "Binance request failed: {}", message);

        return Err(ExchangeError::Api {
            status: status.as_u16(),
            code,
            message,
            details: Some(value),
        });
    }

    serde_json::from_value(value).map_err(|e| ExchangeError::Malformed(format!("{}: {}", endpoint, e)))
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    async fn symbol_info(&self, ticker: &str) -> Result<SymbolInfo, ExchangeError> {
        let resp: ExchangeInfoResponse = self.get_public(EXCHANGE_INFO, ticker).await?;
        resp.find(ticker)?.to_model()
    }

    async fn current_price(&self, ticker: &str) -> Result<Decimal, ExchangeError> {
        let resp: TickerPriceResponse = self.get_public(TICKER_PRICE, ticker).await?;
        resp.to_model()
    }

    async fn account_balance(
        &self,
        credentials: &ApiCredentials,
        asset: &str,
    ) -> Result<Decimal, ExchangeError> {
        let account: AccountInformation = self
            .send_signed(Method::GET, ACCOUNT, credentials, QueryParams::new())
            .await?;
        let free = account.free_balance(asset);
        debug!(asset, %free, can_trade = account.can_trade, "Account balance fetched");
        Ok(free)
    }

    async fn place_market_order(
        &self,
        credentials: &ApiCredentials,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<Value, ExchangeError> {
        let params = QueryParams::new()
            .with("symbol", symbol)
            .with("side", side)
            .with("type", "MARKET")
            .with("quantity", quantity);

        info!("Placing Order: {} {} {}", side, quantity, symbol);
        self.send_signed(Method::POST, ORDER, credentials, params)
            .await
    }
}
