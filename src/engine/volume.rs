//! Fiat amount to asset volume conversion

use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::errors::{DcaError, Result};

/// Decimal places of an order volume
pub const VOLUME_DECIMALS: u32 = 8;

/// Default largest volume accepted for a single order. A quotient above
/// this usually means the price is implausibly small for the amount.
pub const MAX_ORDER_VOLUME: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Convert a fiat amount into a base-asset volume at `ask_price`
///
/// volume = floor(amount_fiat / ask_price, 8 decimals). Rounding is always
/// down so the order never spends more than `amount_fiat`.
///
/// Fails with `DcaError::Calculation` for non-positive inputs, when the
/// amount is too small relative to the price to yield any volume, and when
/// the volume exceeds `MAX_ORDER_VOLUME`.
pub fn compute_volume(amount_fiat: Decimal, ask_price: Decimal) -> Result<Decimal> {
    compute_volume_capped(amount_fiat, ask_price, MAX_ORDER_VOLUME)
}

/// `compute_volume` with an explicit per-order volume limit
pub fn compute_volume_capped(
    amount_fiat: Decimal,
    ask_price: Decimal,
    max_volume: Decimal,
) -> Result<Decimal> {
    if amount_fiat <= Decimal::ZERO {
        return Err(DcaError::Calculation(format!(
            "fiat amount must be positive, got {}",
            amount_fiat
        )));
    }
    if ask_price <= Decimal::ZERO {
        return Err(DcaError::Calculation(format!(
            "ask price must be positive, got {}",
            ask_price
        )));
    }

    let raw = amount_fiat.checked_div(ask_price).ok_or_else(|| {
        DcaError::Calculation(format!(
            "{} / {} is out of decimal range",
            amount_fiat, ask_price
        ))
    })?;

    let mut volume = raw.round_dp_with_strategy(VOLUME_DECIMALS, RoundingStrategy::ToZero);
    if volume <= Decimal::ZERO {
        return Err(DcaError::Calculation(format!(
            "amount {} is too small for price {}: volume rounds down to zero",
            amount_fiat, ask_price
        )));
    }
    if volume > max_volume {
        return Err(DcaError::Calculation(format!(
            "amount {} at price {} gives volume {}, above the {} unit order limit",
            amount_fiat, ask_price, volume, max_volume
        )));
    }
    volume.rescale(VOLUME_DECIMALS);

    Ok(volume)
}
