//! Collateral and debt ledgers
//!
//! `Ledger` is the committed store. Operations never write it directly: they
//! stage writes, token effects and events in a `LedgerTx` that reads through
//! to the committed store and is applied only when the operation succeeds.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{error::EngineError, events::EngineEvent, token::ExternalEffect};

/// Read access to per-user balances
pub trait PositionView {
    fn collateral_of(&self, user: &Pubkey, asset: &Pubkey) -> u128;
    fn debt_of(&self, user: &Pubkey) -> u128;
}

/// Collateral deposits and outstanding debt of one user
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub collateral: BTreeMap<Pubkey, u128>,
    pub debt: u128,
}

impl UserPosition {
    pub fn collateral_of(&self, asset: &Pubkey) -> u128 {
        self.collateral.get(asset).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.debt == 0 && self.collateral.values().all(|amount| *amount == 0)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    positions: BTreeMap<Pubkey, UserPosition>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, user: &Pubkey) -> Option<&UserPosition> {
        self.positions.get(user)
    }

    pub fn user_count(&self) -> usize {
        self.positions.len()
    }

    /// Commit staged writes. Positions are created on first touch and kept
    /// even when they return to zero.
    pub fn apply(&mut self, writes: LedgerWrites) {
        for ((user, asset), amount) in writes.collateral {
            self.positions
                .entry(user)
                .or_default()
                .collateral
                .insert(asset, amount);
        }

        for (user, debt) in writes.debt {
            self.positions.entry(user).or_default().debt = debt;
        }
    }
}

impl PositionView for Ledger {
    fn collateral_of(&self, user: &Pubkey, asset: &Pubkey) -> u128 {
        self.positions
            .get(user)
            .map(|position| position.collateral_of(asset))
            .unwrap_or(0)
    }

    fn debt_of(&self, user: &Pubkey) -> u128 {
        self.positions.get(user).map(|position| position.debt).unwrap_or(0)
    }
}

/// Absolute balances written by a pending operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerWrites {
    collateral: BTreeMap<(Pubkey, Pubkey), u128>,
    debt: BTreeMap<Pubkey, u128>,
}

/// Pending operation over a committed ledger
pub struct LedgerTx<'a> {
    base: &'a Ledger,
    writes: LedgerWrites,
    effects: Vec<ExternalEffect>,
    events: Vec<EngineEvent>,
}

impl<'a> LedgerTx<'a> {
    pub fn new(base: &'a Ledger) -> Self {
        Self {
            base,
            writes: LedgerWrites::default(),
            effects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn credit_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        let balance = self
            .collateral_of(user, asset)
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.writes.collateral.insert((*user, *asset), balance);
        Ok(balance)
    }

    pub fn debit_collateral(&mut self, user: &Pubkey, asset: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        let balance = self
            .collateral_of(user, asset)
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientCollateral)?;
        self.writes.collateral.insert((*user, *asset), balance);
        Ok(balance)
    }

    pub fn increase_debt(&mut self, user: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        let debt = self
            .debt_of(user)
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.writes.debt.insert(*user, debt);
        Ok(debt)
    }

    pub fn decrease_debt(&mut self, user: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        let debt = self
            .debt_of(user)
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientDebt)?;
        self.writes.debt.insert(*user, debt);
        Ok(debt)
    }

    pub fn stage_effect(&mut self, effect: ExternalEffect) {
        self.effects.push(effect);
    }

    pub fn record_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn effects(&self) -> &[ExternalEffect] {
        &self.effects
    }

    /// Release the borrow of the committed ledger
    pub fn into_parts(self) -> (LedgerWrites, Vec<EngineEvent>) {
        (self.writes, self.events)
    }
}

impl PositionView for LedgerTx<'_> {
    fn collateral_of(&self, user: &Pubkey, asset: &Pubkey) -> u128 {
        self.writes
            .collateral
            .get(&(*user, *asset))
            .copied()
            .unwrap_or_else(|| self.base.collateral_of(user, asset))
    }

    fn debt_of(&self, user: &Pubkey) -> u128 {
        self.writes
            .debt
            .get(user)
            .copied()
            .unwrap_or_else(|| self.base.debt_of(user))
    }
}
