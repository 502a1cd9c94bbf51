//! Fiat-to-token amount conversion.
//!
//! Converts the configured fiat stipend into the token's smallest unit at the
//! resolved price. The whole money path is exact: the decimal operands are
//! split into integer mantissa/scale pairs and the division is done in
//! [`U256`], truncating toward zero. Truncation never overpays; rounding up
//! could.

use crate::price::PriceQuote;
use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors converting a fiat amount into token units.
#[derive(Debug, Error)]
pub enum AmountError {
    /// The configured fiat amount is zero or negative.
    #[error("fiat amount must be positive, got {0}")]
    NonPositiveFiat(Decimal),
    /// The resolved price is zero or negative.
    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),
    /// The scaled amount does not fit in a uint256.
    #[error("token amount for {fiat} at price {price} overflows uint256")]
    Overflow {
        /// The fiat amount being converted.
        fiat: Decimal,
        /// The price used for conversion.
        price: Decimal,
    },
}

/// Converts `fiat` into the token's smallest unit at the quoted price.
///
/// Computes `floor(fiat / price * 10^decimals)` exactly: with
/// `fiat = fm * 10^-fs` and `price = pm * 10^-ps`, the result is
/// `fm * 10^(decimals + ps) / (pm * 10^fs)` in truncating integer division.
pub fn to_smallest_unit(
    fiat: Decimal,
    quote: &PriceQuote,
    decimals: u8,
) -> Result<U256, AmountError> {
    let price = quote.price;
    if fiat <= Decimal::ZERO {
        return Err(AmountError::NonPositiveFiat(fiat));
    }
    if price <= Decimal::ZERO {
        return Err(AmountError::NonPositivePrice(price));
    }

    let overflow = || AmountError::Overflow { fiat, price };

    let fiat_mantissa = U256::from(fiat.mantissa().unsigned_abs());
    let price_mantissa = U256::from(price.mantissa().unsigned_abs());

    let numerator = fiat_mantissa
        .checked_mul(pow10(decimals as u32 + price.scale()).ok_or_else(overflow)?)
        .ok_or_else(overflow)?;
    let denominator = price_mantissa
        .checked_mul(pow10(fiat.scale()).ok_or_else(overflow)?)
        .ok_or_else(overflow)?;

    // U256 division truncates toward zero, which is exactly the floor here
    // since both operands are non-negative.
    Ok(numerator / denominator)
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}
