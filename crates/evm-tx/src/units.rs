//! Fixed-point amount scaling
//!
//! Converts between human-scale decimal amounts and on-chain base units
//! (`human * 10^decimals`). All arithmetic is exact: `BigDecimal` for the
//! human side, `U256` for the chain side, `BigInt` in between.

use std::str::FromStr;

use alloy::primitives::U256;
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};
use thiserror::Error;
use weir_core::constants::TOKEN_PRECISION;

/// Largest power of ten below 2^256 is 10^77
const MAX_U256_DIGITS: i64 = 78;

/// Widest decimal exponent a parsed amount may carry, either way
const MAX_EXPONENT: i64 = MAX_U256_DIGITS + TOKEN_PRECISION as i64;

/// Slippage fractions are truncated to this many decimal places
const SLIPPAGE_PRECISION: i64 = TOKEN_PRECISION as i64;

/// Amount conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("Invalid amount '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Amount does not fit in 256 bits: {0}")]
    Overflow(String),

    #[error("Slippage must be in [0, 1), got {0}")]
    InvalidSlippage(String),
}

fn pow10(exponent: i64) -> BigInt {
    BigInt::from(10u8).pow(exponent as u32)
}

fn is_negative(value: &BigDecimal) -> bool {
    value.sign() == Sign::Minus
}

fn is_zero(value: &BigDecimal) -> bool {
    value.sign() == Sign::NoSign
}

pub(crate) fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

pub(crate) fn bigint_to_u256(value: &BigInt) -> Option<U256> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return None;
    }
    U256::try_from_be_slice(&bytes)
}

/// Multiply `value` by `10^exponent`. The exponent may be negative.
pub fn scale(value: &BigDecimal, exponent: i64) -> BigDecimal {
    let (digits, scale) = value.as_bigint_and_exponent();
    BigDecimal::new(digits, scale - exponent)
}

/// Scale a human amount by `10^decimals` and truncate toward zero.
pub fn to_base_units_with(amount: &BigDecimal, decimals: u8) -> Result<U256, UnitError> {
    if is_negative(amount) {
        return Err(UnitError::Negative(amount.to_string()));
    }
    if is_zero(amount) {
        return Ok(U256::ZERO);
    }

    let (_, exponent) = amount.as_bigint_and_exponent();
    if -exponent > MAX_U256_DIGITS {
        return Err(UnitError::Overflow(amount.to_string()));
    }

    // At scale `decimals` the digits are exactly `amount * 10^decimals`
    let (integer, _) = amount
        .with_scale_round(decimals as i64, RoundingMode::Down)
        .into_bigint_and_exponent();

    bigint_to_u256(&integer).ok_or_else(|| UnitError::Overflow(amount.to_string()))
}

/// Scale a human amount to protocol base units (10^18), truncating.
pub fn to_base_units(amount: &BigDecimal) -> Result<U256, UnitError> {
    to_base_units_with(amount, TOKEN_PRECISION)
}

/// Scale base units back to a human amount by `10^-decimals`, exactly.
pub fn from_base_units_with(amount: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_bigint(amount), decimals as i64)
}

/// Scale protocol base units (10^18) back to a human amount.
pub fn from_base_units(amount: U256) -> BigDecimal {
    from_base_units_with(amount, TOKEN_PRECISION)
}

/// Parse a human-entered decimal amount.
pub fn parse_amount(input: &str) -> Result<BigDecimal, UnitError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnitError::Parse {
            input: input.to_string(),
            reason: "empty".to_string(),
        });
    }

    let value = BigDecimal::from_str(trimmed).map_err(|e| UnitError::Parse {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    if is_negative(&value) {
        return Err(UnitError::Negative(trimmed.to_string()));
    }

    let (_, exponent) = value.as_bigint_and_exponent();
    if exponent.unsigned_abs() > MAX_EXPONENT as u64 {
        return Err(UnitError::Parse {
            input: input.to_string(),
            reason: format!("exponent beyond {} digits", MAX_EXPONENT),
        });
    }
    Ok(value)
}

/// Split a slippage fraction into `numerator / denominator`, validating `0 <= s < 1`.
/// Digits past `SLIPPAGE_PRECISION` places are dropped, which only tightens the bound.
fn slippage_ratio(max_slippage: &BigDecimal) -> Result<(BigInt, BigInt), UnitError> {
    if is_negative(max_slippage) || *max_slippage >= BigDecimal::from(1) {
        return Err(UnitError::InvalidSlippage(max_slippage.to_string()));
    }

    let (digits, exponent) = max_slippage.as_bigint_and_exponent();
    if exponent <= 0 {
        // An integer below one is zero
        return Ok((BigInt::from(0), BigInt::from(1)));
    }
    if exponent > SLIPPAGE_PRECISION {
        let (digits, _) = max_slippage
            .with_scale_round(SLIPPAGE_PRECISION, RoundingMode::Down)
            .into_bigint_and_exponent();
        return Ok((digits, pow10(SLIPPAGE_PRECISION)));
    }
    Ok((digits, pow10(exponent)))
}

/// `floor(expected / (1 + max_slippage))`: the least output a trade may accept.
pub fn slippage_floor(expected: U256, max_slippage: &BigDecimal) -> Result<U256, UnitError> {
    let (num, denom) = slippage_ratio(max_slippage)?;
    let expected = u256_to_bigint(expected);

    let bound = expected * &denom / (&denom + num);
    bigint_to_u256(&bound).ok_or_else(|| UnitError::Overflow(bound.to_string()))
}

/// `ceil(expected * (1 + max_slippage))`: the most input a trade may spend.
pub fn slippage_ceil(expected: U256, max_slippage: &BigDecimal) -> Result<U256, UnitError> {
    let (num, denom) = slippage_ratio(max_slippage)?;
    let expected = u256_to_bigint(expected);

    let bound = (expected * (&denom + num) + &denom - BigInt::from(1)) / &denom;
    bigint_to_u256(&bound).ok_or_else(|| UnitError::Overflow(bound.to_string()))
}
