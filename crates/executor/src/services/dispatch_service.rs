use std::sync::Arc;
use std::time::Duration;

use common::RelayError;
use common::models::{ApiCredentials, OrderResult, Side, TradeSignal};
use market_data::ExchangeApi;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::services::credential_service::CredentialService;
use crate::services::dedup_service::DedupWindow;
use crate::services::quantity_service;

/// Runs one webhook signal through the order pipeline:
/// authenticate, validate, fetch symbol + price, size, sign and submit.
///
/// Nothing is retried. The first failure ends the request, and at most one
/// order is submitted per call. The whole chain shares a single deadline.
pub struct DispatchService {
    exchange: Arc<dyn ExchangeApi>,
    credentials: CredentialService,
    dedup: DedupWindow,
    deadline: Duration,
}

impl DispatchService {
    pub fn new(
        exchange: Arc<dyn ExchangeApi>,
        credentials: CredentialService,
        dedup: DedupWindow,
        deadline: Duration,
    ) -> Self {
        Self {
            exchange,
            credentials,
            dedup,
            deadline,
        }
    }

    /// Every failure is folded into the returned `OrderResult`.
    pub async fn handle(&self, token: &str, body: &[u8]) -> OrderResult {
        let span = info_span!("webhook", request_id = %Uuid::new_v4());

        async move {
            let outcome = match timeout(self.deadline, self.execute(token, body)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RelayError::upstream(
                    format!(
                        "Order pipeline exceeded the {} ms deadline",
                        self.deadline.as_millis()
                    ),
                    Some(504),
                )),
            };

            match outcome {
                Ok(order) => {
                    info!(order = %order, "Order placed");
                    OrderResult::success(order)
                }
                Err(err) => {
                    let result = OrderResult::from(&err);
                    if result.code >= 500 {
                        error!(code = result.code, "Signal failed: {}", err);
                    } else {
                        warn!(code = result.code, "Signal rejected: {}", err);
                    }
                    result
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, token: &str, body: &[u8]) -> Result<Value, RelayError> {
        let credentials = self.credentials.resolve(token).await?;

        let signal: TradeSignal = serde_json::from_slice(body)
            .map_err(|e| RelayError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        info!(
            ticker = ?signal.ticker,
            action = ?signal.action,
            quantity = ?signal.quantity,
            credentials = %credentials.source,
            "Received signal"
        );

        let ticker = signal.require_ticker()?;
        let side = signal.require_side()?;
        if let Some(quantity) = signal.quantity {
            if quantity <= Decimal::ZERO {
                return Err(RelayError::BadRequest(
                    "quantity must be greater than zero".to_string(),
                ));
            }
        }

        let key = signal
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        let claim = match key {
            Some(key) => match self.dedup.try_claim(key) {
                Some(claim) => Some(claim),
                None => {
                    return Err(RelayError::BadRequest(format!(
                        "Duplicate signal '{}' ignored",
                        key
                    )));
                }
            },
            None => None,
        };

        // an early return or a dropped future gives the claim back
        let quantity = match signal.quantity {
            Some(quantity) => quantity,
            None => self.size_order(&credentials, &ticker, side).await?,
        };

        if let Some(claim) = claim {
            claim.commit();
        }
        let order = self
            .exchange
            .place_market_order(&credentials, &ticker, side, quantity)
            .await?;
        Ok(order)
    }

    /// Lookups run strictly in sequence: the quantity needs all of them.
    async fn size_order(
        &self,
        credentials: &ApiCredentials,
        ticker: &str,
        side: Side,
    ) -> Result<Decimal, RelayError> {
        let symbol = self.exchange.symbol_info(ticker).await?;
        let price = self.exchange.current_price(ticker).await?;

        // only the balance on the spending side is fetched
        let (quote_balance, base_balance) = match side {
            Side::Buy => (
                self.exchange
                    .account_balance(credentials, &symbol.quote_asset)
                    .await?,
                Decimal::ZERO,
            ),
            Side::Sell => (
                Decimal::ZERO,
                self.exchange
                    .account_balance(credentials, &symbol.base_asset)
                    .await?,
            ),
        };

        let quantity =
            quantity_service::resolve_quantity(side, &symbol, price, quote_balance, base_balance)?;
        debug!(
            %price,
            %quote_balance,
            %base_balance,
            step = %symbol.step_size,
            %quantity,
            "Order sized"
        );
        Ok(quantity)
    }
}
