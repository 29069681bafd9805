//! Collateral Vault
//!
//! Per-user, per-asset deposit bookkeeping. Each ledger change is paired with
//! a staged collateral token transfer.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    error::EngineError,
    events::{CollateralDeposited, CollateralRedeemed, EngineEvent},
    state::{CollateralRegistry, LedgerTx},
    token::ExternalEffect,
};

pub struct CollateralVault<'r> {
    registry: &'r CollateralRegistry,
}

impl<'r> CollateralVault<'r> {
    pub fn new(registry: &'r CollateralRegistry) -> Self {
        Self { registry }
    }

    /// Credit `amount` of `asset` to `user` and stage the pull into custody
    pub fn deposit(
        &self,
        tx: &mut LedgerTx<'_>,
        user: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<u128, EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.registry.ensure_supported(asset)?;

        let balance = tx.credit_collateral(user, asset, amount)?;
        tx.stage_effect(ExternalEffect::PullCollateral {
            asset: *asset,
            from: *user,
            amount,
        });
        tx.record_event(EngineEvent::CollateralDeposited(CollateralDeposited {
            user: *user,
            asset: *asset,
            amount,
        }));

        msg!("Deposit {} of {} for {}, balance {}", amount, asset, user, balance);
        Ok(balance)
    }

    /// Debit `amount` of `asset` from `from` and stage the release to `to`
    pub fn redeem(
        &self,
        tx: &mut LedgerTx<'_>,
        from: &Pubkey,
        to: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<u128, EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        self.registry.ensure_supported(asset)?;

        let balance = tx.debit_collateral(from, asset, amount).map_err(|err| {
            msg!("Redeem of {} {} exceeds deposit of {}", amount, asset, from);
            err
        })?;
        tx.stage_effect(ExternalEffect::ReleaseCollateral {
            asset: *asset,
            to: *to,
            amount,
        });
        tx.record_event(EngineEvent::CollateralRedeemed(CollateralRedeemed {
            from: *from,
            to: *to,
            asset: *asset,
            amount,
        }));

        msg!("Redeem {} of {} from {} to {}, balance {}", amount, asset, from, to, balance);
        Ok(balance)
    }
}
