//! Debt Ledger
//!
//! Outstanding issuance per user, paired with staged mint and burn effects.

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    error::EngineError,
    events::{DebtBurned, DebtMinted, EngineEvent},
    state::LedgerTx,
    token::ExternalEffect,
};

pub struct DebtLedger;

impl DebtLedger {
    /// Increase `user` debt and stage the mint. The caller must check the
    /// health factor before the transaction settles.
    pub fn increase_debt(tx: &mut LedgerTx<'_>, user: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }

        let debt = tx.increase_debt(user, amount)?;
        tx.stage_effect(ExternalEffect::MintIssuance { to: *user, amount });
        tx.record_event(EngineEvent::DebtMinted(DebtMinted { user: *user, amount }));

        msg!("Debt of {} increased by {} to {}", user, amount, debt);
        Ok(debt)
    }

    /// Decrease debt of `on_behalf_of`, paid with tokens pulled from `payer`
    /// and burned
    pub fn decrease_debt(
        tx: &mut LedgerTx<'_>,
        on_behalf_of: &Pubkey,
        payer: &Pubkey,
        amount: u128,
    ) -> Result<u128, EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }

        let debt = tx.decrease_debt(on_behalf_of, amount).map_err(|err| {
            msg!("Burn of {} exceeds debt of {}", amount, on_behalf_of);
            err
        })?;
        tx.stage_effect(ExternalEffect::PullIssuance { from: *payer, amount });
        tx.stage_effect(ExternalEffect::BurnIssuance { amount });
        tx.record_event(EngineEvent::DebtBurned(DebtBurned {
            on_behalf_of: *on_behalf_of,
            payer: *payer,
            amount,
        }));

        msg!("Debt of {} decreased by {} to {} (paid by {})", on_behalf_of, amount, debt, payer);
        Ok(debt)
    }
}
