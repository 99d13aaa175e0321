use common::RelayError;
use common::models::{Side, SymbolInfo};
use rust_decimal::Decimal;

/// Largest multiple of `step` that does not exceed `raw`.
///
/// Works on decimal fixed-point, so `0.1 + 0.2` style drift cannot push a
/// quantity over the balance. For power-of-ten steps this is the same as
/// truncating to `log10(1/step)` decimals; other steps (`0.5`, `0.25`) are
/// handled as plain multiples. A non-positive `step` means no constraint.
pub fn round_to_step(raw: Decimal, step: Decimal) -> Decimal {
    if raw <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let step = step.normalize();
    if step <= Decimal::ZERO {
        return raw;
    }
    match raw.checked_div(step) {
        Some(steps) => steps.floor() * step,
        None => Decimal::ZERO,
    }
}

/// Order size for `side`: the whole free quote balance converted at
/// `current_price` for a BUY, the whole free base balance for a SELL, rounded
/// down to the lot-size step. Only the balance matching `side` is read.
pub fn resolve_quantity(
    side: Side,
    symbol: &SymbolInfo,
    current_price: Decimal,
    quote_balance: Decimal,
    base_balance: Decimal,
) -> Result<Decimal, RelayError> {
    if symbol.step_size <= Decimal::ZERO {
        return Err(RelayError::upstream(
            format!("Invalid LOT_SIZE step {} for {}", symbol.step_size, symbol.symbol),
            None,
        ));
    }

    let (raw, asset) = match side {
        Side::Buy => {
            if current_price <= Decimal::ZERO {
                return Err(RelayError::upstream(
                    format!("Invalid price {} for {}", current_price, symbol.symbol),
                    None,
                ));
            }
            let raw = quote_balance
                .checked_div(current_price)
                .unwrap_or(Decimal::ZERO);
            (raw, &symbol.quote_asset)
        }
        Side::Sell => (base_balance, &symbol.base_asset),
    };

    let quantity = round_to_step(raw, symbol.step_size);
    if quantity <= Decimal::ZERO {
        return Err(RelayError::InsufficientBalance {
            asset: asset.clone(),
        });
    }
    Ok(quantity)
}
