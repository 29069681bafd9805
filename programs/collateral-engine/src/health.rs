//! Health Factor Calculator
//!
//! health = (collateral_usd * threshold / precision) * 1e18 / debt
//! Positions without debt report `HEALTH_FACTOR_UNCONSTRAINED`.

use solana_program::pubkey::Pubkey;

use crate::{
    error::EngineError,
    math::{apply_ratio, mul_div_saturating, usd_value, HEALTH_FACTOR_UNCONSTRAINED, PRECISION},
    state::{CollateralRegistry, EngineConfig, PositionView},
};

pub fn calculate_health_factor(
    config: &EngineConfig,
    total_debt: u128,
    collateral_value_usd: u128,
) -> Result<u128, EngineError> {
    if total_debt == 0 {
        return Ok(HEALTH_FACTOR_UNCONSTRAINED);
    }

    let adjusted_collateral = apply_ratio(
        collateral_value_usd,
        config.liquidation_threshold,
        config.liquidation_precision,
    )?;

    mul_div_saturating(adjusted_collateral, PRECISION, total_debt)
}

/// Sum of the USD value of every supported asset `user` has deposited
pub fn account_collateral_value<V: PositionView + ?Sized>(
    view: &V,
    registry: &CollateralRegistry,
    user: &Pubkey,
) -> Result<u128, EngineError> {
    let mut total: u128 = 0;

    for asset in registry.assets() {
        let amount = view.collateral_of(user, asset);
        if amount == 0 {
            continue;
        }

        let price = registry.price_of(asset)?;
        total = total
            .checked_add(usd_value(&price, amount)?)
            .ok_or(EngineError::ArithmeticOverflow)?;
    }

    Ok(total)
}

/// (total debt, collateral value in USD)
pub fn account_information<V: PositionView + ?Sized>(
    view: &V,
    registry: &CollateralRegistry,
    user: &Pubkey,
) -> Result<(u128, u128), EngineError> {
    Ok((view.debt_of(user), account_collateral_value(view, registry, user)?))
}

pub fn health_factor<V: PositionView + ?Sized>(
    view: &V,
    registry: &CollateralRegistry,
    config: &EngineConfig,
    user: &Pubkey,
) -> Result<u128, EngineError> {
    let (total_debt, collateral_value) = account_information(view, registry, user)?;
    calculate_health_factor(config, total_debt, collateral_value)
}

/// Fails with `HealthFactorBroken` when `user` is below the configured floor
pub fn ensure_health_factor<V: PositionView + ?Sized>(
    view: &V,
    registry: &CollateralRegistry,
    config: &EngineConfig,
    user: &Pubkey,
) -> Result<u128, EngineError> {
    let value = health_factor(view, registry, config, user)?;
    if value < config.min_health_factor {
        solana_program::msg!("Health factor of {} broken: {}", user, value);
        return Err(EngineError::HealthFactorBroken(value));
    }
    Ok(value)
}
