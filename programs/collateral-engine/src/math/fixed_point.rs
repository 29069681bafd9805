use ethereum_types::U256;

use crate::{error::EngineError, oracle::OraclePrice};

/// Engine fixed point scale (18 decimals)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;
pub const PRECISION_DECIMALS: u8 = 18;

/// Decimal scale the standard USD price feeds report in
pub const FEED_DECIMALS: u8 = 8;

/// Factor lifting an 8 decimal feed answer to engine precision
pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;

/// Health factor reported for positions without debt
pub const HEALTH_FACTOR_UNCONSTRAINED: u128 = u128::MAX;

/// a * b / denominator with a 256-bit intermediate, rounding down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, EngineError> {
    let result = wide_mul_div(a, b, denominator)?;
    if result > U256::from(u128::MAX) {
        return Err(EngineError::ArithmeticOverflow);
    }
    Ok(result.low_u128())
}

/// Same as `mul_div` but clamps to `u128::MAX` instead of failing
pub fn mul_div_saturating(a: u128, b: u128, denominator: u128) -> Result<u128, EngineError> {
    let result = wide_mul_div(a, b, denominator)?;
    if result > U256::from(u128::MAX) {
        Ok(u128::MAX)
    } else {
        Ok(result.low_u128())
    }
}

fn wide_mul_div(a: u128, b: u128, denominator: u128) -> Result<U256, EngineError> {
    if denominator == 0 {
        return Err(EngineError::DivisionByZero);
    }
    // u128 * u128 always fits in 256 bits
    Ok(U256::from(a) * U256::from(b) / U256::from(denominator))
}

/// Multiplier taking a feed answer with `decimals` places to engine precision
pub fn feed_scale_factor(decimals: u8) -> Result<u128, EngineError> {
    if decimals > PRECISION_DECIMALS {
        return Err(EngineError::InvalidPrice);
    }
    if decimals == FEED_DECIMALS {
        return Ok(ADDITIONAL_FEED_PRECISION);
    }
    Ok(10u128.pow((PRECISION_DECIMALS - decimals) as u32))
}

/// Oracle price lifted to engine precision. Zero prices are rejected.
pub fn normalized_price(price: &OraclePrice) -> Result<u128, EngineError> {
    if price.value == 0 {
        return Err(EngineError::InvalidPrice);
    }
    price
        .value
        .checked_mul(feed_scale_factor(price.decimals)?)
        .ok_or(EngineError::ArithmeticOverflow)
}

/// USD value (engine precision) of `amount` units priced at `price`
pub fn usd_value(price: &OraclePrice, amount: u128) -> Result<u128, EngineError> {
    mul_div(normalized_price(price)?, amount, PRECISION)
}

/// Units of the asset worth `usd_amount` (engine precision) at `price`
pub fn token_amount_from_usd(price: &OraclePrice, usd_amount: u128) -> Result<u128, EngineError> {
    mul_div(usd_amount, PRECISION, normalized_price(price)?)
}

/// value * numerator / denominator, used for threshold and bonus ratios
pub fn apply_ratio(value: u128, numerator: u128, denominator: u128) -> Result<u128, EngineError> {
    mul_div(value, numerator, denominator)
}
