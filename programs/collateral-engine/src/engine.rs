//! Collateral engine
//!
//! Orchestrates deposits, redemptions, debt issuance and liquidation over the
//! collateral vault and debt ledger. Every entry point runs as one guarded
//! transaction: ledger writes, token effects and events are staged, checked
//! against the health factor invariant, settled against the token programs
//! and only then committed. Any failure discards the whole transaction.

use std::cell::RefCell;

use solana_program::{msg, pubkey::Pubkey};

use crate::{
    debt_ledger::DebtLedger,
    error::EngineError,
    events::{EngineEvent, PositionLiquidated},
    health,
    math::{self, apply_ratio},
    oracle::PriceFeed,
    security::ReentrancyGuard,
    state::{CollateralRegistry, EngineConfig, Ledger, LedgerTx, PositionView, UserPosition},
    token::{CollateralToken, ExternalEffect, IssuanceToken},
    vault::CollateralVault,
};

/// Amounts moved by a successful liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationOutcome {
    /// Collateral equal in value to the covered debt
    pub collateral_units: u128,
    pub bonus: u128,
    /// collateral_units + bonus, sent to the liquidator
    pub collateral_seized: u128,
    pub debt_covered: u128,
    pub starting_health_factor: u128,
    pub ending_health_factor: u128,
}

pub struct CollateralEngine<C, I> {
    config: EngineConfig,
    registry: CollateralRegistry,
    collateral_token: C,
    issuance_token: I,
    ledger: RefCell<Ledger>,
    journal: RefCell<Vec<EngineEvent>>,
    guard: ReentrancyGuard,
}

impl<C: CollateralToken, I: IssuanceToken> CollateralEngine<C, I> {
    /// Build an engine over `assets`, priced by the feed at the same index
    pub fn new(
        config: EngineConfig,
        assets: Vec<Pubkey>,
        price_feeds: Vec<Box<dyn PriceFeed>>,
        collateral_token: C,
        issuance_token: I,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let registry = CollateralRegistry::new(assets, price_feeds)?;

        msg!(
            "Collateral engine initialized: {} assets, issuing {}, threshold {}/{}, bonus {}/{}",
            registry.assets().len(),
            config.issuance_mint,
            config.liquidation_threshold,
            config.liquidation_precision,
            config.liquidation_bonus,
            config.liquidation_precision
        );

        Ok(Self {
            config,
            registry,
            collateral_token,
            issuance_token,
            ledger: RefCell::new(Ledger::new()),
            journal: RefCell::new(Vec::new()),
            guard: ReentrancyGuard::new(),
        })
    }

    /// Resume from a previously persisted ledger
    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = RefCell::new(ledger);
        self
    }

    /// Deposit collateral and mint debt in one transaction
    pub fn deposit_collateral_and_mint(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<(), EngineError> {
        self.transact("deposit_collateral_and_mint", |tx| {
            self.deposit_step(tx, caller, asset, collateral_amount)?;
            self.mint_step(tx, caller, debt_amount)
        })
    }

    pub fn deposit_collateral(&self, caller: &Pubkey, asset: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.transact("deposit_collateral", |tx| {
            self.deposit_step(tx, caller, asset, amount)
        })
    }

    /// Burn debt first, then withdraw collateral, in one transaction
    pub fn redeem_collateral_for_debt(
        &self,
        caller: &Pubkey,
        asset: &Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    ) -> Result<(), EngineError> {
        self.transact("redeem_collateral_for_debt", |tx| {
            self.burn_step(tx, caller, caller, debt_amount)?;
            self.redeem_step(tx, caller, caller, asset, collateral_amount)
        })
    }

    pub fn redeem_collateral(&self, caller: &Pubkey, asset: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.transact("redeem_collateral", |tx| {
            self.redeem_step(tx, caller, caller, asset, amount)
        })
    }

    pub fn mint_debt(&self, caller: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.transact("mint_debt", |tx| self.mint_step(tx, caller, amount))
    }

    pub fn burn_debt(&self, caller: &Pubkey, amount: u128) -> Result<(), EngineError> {
        self.transact("burn_debt", |tx| self.burn_step(tx, caller, caller, amount))
    }

    /// Cover `debt_to_cover` of an undercollateralized `victim` and take the
    /// equivalent `asset` collateral plus the liquidation bonus.
    ///
    /// Seizure is never capped: if the victim has less of `asset` deposited
    /// than the computed seizure, the liquidation fails with
    /// `InsufficientCollateral`.
    pub fn liquidate(
        &self,
        liquidator: &Pubkey,
        asset: &Pubkey,
        victim: &Pubkey,
        debt_to_cover: u128,
    ) -> Result<LiquidationOutcome, EngineError> {
        self.transact("liquidate", |tx| {
            if debt_to_cover == 0 {
                return Err(EngineError::ZeroAmount);
            }
            self.registry.ensure_supported(asset)?;

            let starting_health_factor = health::health_factor(&*tx, &self.registry, &self.config, victim)?;
            if starting_health_factor >= self.config.min_health_factor {
                msg!("Position {} is healthy: {}", victim, starting_health_factor);
                return Err(EngineError::HealthFactorOk);
            }

            let price = self.registry.price_of(asset)?;
            let collateral_units = math::token_amount_from_usd(&price, debt_to_cover)?;
            let bonus = apply_ratio(
                collateral_units,
                self.config.liquidation_bonus,
                self.config.liquidation_precision,
            )?;
            let collateral_seized = collateral_units
                .checked_add(bonus)
                .ok_or(EngineError::ArithmeticOverflow)?;

            let deposited = tx.collateral_of(victim, asset);
            if collateral_seized > deposited {
                msg!(
                    "Seizure of {} {} exceeds deposit of {} held by {}",
                    collateral_seized,
                    asset,
                    deposited,
                    victim
                );
                return Err(EngineError::InsufficientCollateral);
            }

            CollateralVault::new(&self.registry).redeem(tx, victim, liquidator, asset, collateral_seized)?;
            DebtLedger::decrease_debt(tx, victim, liquidator, debt_to_cover)?;

            let ending_health_factor = health::health_factor(&*tx, &self.registry, &self.config, victim)?;
            if ending_health_factor <= starting_health_factor {
                msg!(
                    "Liquidation of {} did not improve health: {} -> {}",
                    victim,
                    starting_health_factor,
                    ending_health_factor
                );
                return Err(EngineError::HealthFactorNotImproved);
            }

            health::ensure_health_factor(&*tx, &self.registry, &self.config, liquidator)?;

            tx.record_event(EngineEvent::PositionLiquidated(PositionLiquidated {
                victim: *victim,
                liquidator: *liquidator,
                asset: *asset,
                debt_covered: debt_to_cover,
                collateral_seized,
            }));

            msg!(
                "Liquidated {}: covered {}, seized {} (bonus {}), health {} -> {}",
                victim,
                debt_to_cover,
                collateral_seized,
                bonus,
                starting_health_factor,
                ending_health_factor
            );

            Ok(LiquidationOutcome {
                collateral_units,
                bonus,
                collateral_seized,
                debt_covered: debt_to_cover,
                starting_health_factor,
                ending_health_factor,
            })
        })
    }

    fn deposit_step(
        &self,
        tx: &mut LedgerTx<'_>,
        user: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        CollateralVault::new(&self.registry).deposit(tx, user, asset, amount)?;
        Ok(())
    }

    fn redeem_step(
        &self,
        tx: &mut LedgerTx<'_>,
        from: &Pubkey,
        to: &Pubkey,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        CollateralVault::new(&self.registry).redeem(tx, from, to, asset, amount)?;
        health::ensure_health_factor(&*tx, &self.registry, &self.config, from)?;
        Ok(())
    }

    fn mint_step(&self, tx: &mut LedgerTx<'_>, user: &Pubkey, amount: u128) -> Result<(), EngineError> {
        DebtLedger::increase_debt(tx, user, amount)?;
        health::ensure_health_factor(&*tx, &self.registry, &self.config, user)?;
        Ok(())
    }

    /// Burning debt can only raise the health factor, so an undercollateralized
    /// user may still repay part of a position. Only a drop below the floor
    /// that the burn itself caused is rejected.
    fn burn_step(
        &self,
        tx: &mut LedgerTx<'_>,
        on_behalf_of: &Pubkey,
        payer: &Pubkey,
        amount: u128,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }

        let before = health::health_factor(&*tx, &self.registry, &self.config, on_behalf_of)?;
        DebtLedger::decrease_debt(tx, on_behalf_of, payer, amount)?;
        let after = health::health_factor(&*tx, &self.registry, &self.config, on_behalf_of)?;

        if after < self.config.min_health_factor && after < before {
            return Err(EngineError::HealthFactorBroken(after));
        }
        Ok(())
    }

    /// Run `body` as one guarded, all-or-nothing transaction
    fn transact<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut LedgerTx<'_>) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let _entered = self.guard.enter(operation)?;

        let ledger = self.ledger.borrow();
        let mut tx = LedgerTx::new(&ledger);

        let result = match body(&mut tx) {
            Ok(value) => self.settle(tx.effects()).map(|_| value),
            Err(err) => Err(err),
        };

        match result {
            Ok(value) => {
                let (writes, events) = tx.into_parts();
                drop(ledger);
                self.ledger.borrow_mut().apply(writes);

                for event in &events {
                    event.emit();
                }
                self.journal.borrow_mut().extend(events);

                msg!("{} committed", operation);
                Ok(value)
            }
            Err(err) => {
                msg!("{} aborted: {}", operation, err);
                Err(err)
            }
        }
    }

    /// Execute staged token effects, inbound before outbound
    fn settle(&self, effects: &[ExternalEffect]) -> Result<(), EngineError> {
        let custody = &self.config.engine_authority;

        let mut ordered: Vec<&ExternalEffect> = effects.iter().collect();
        ordered.sort_by_key(|effect| effect.settlement_rank());

        for effect in ordered {
            match *effect {
                ExternalEffect::PullCollateral { asset, from, amount } => {
                    self.collateral_token
                        .transfer_from(&asset, &from, custody, amount)
                        .map_err(|err| {
                            msg!("Collateral pull of {} {} from {} failed: {:?}", amount, asset, from, err);
                            EngineError::TransferFailed
                        })?;
                }
                ExternalEffect::ReleaseCollateral { asset, to, amount } => {
                    self.collateral_token
                        .transfer(&asset, custody, &to, amount)
                        .map_err(|err| {
                            msg!("Collateral release of {} {} to {} failed: {:?}", amount, asset, to, err);
                            EngineError::TransferFailed
                        })?;
                }
                ExternalEffect::MintIssuance { to, amount } => {
                    self.issuance_token.mint(&to, amount).map_err(|err| {
                        msg!("Mint of {} to {} failed: {:?}", amount, to, err);
                        EngineError::MintFailed
                    })?;
                }
                ExternalEffect::PullIssuance { from, amount } => {
                    self.issuance_token
                        .transfer_from(&from, custody, amount)
                        .map_err(|err| {
                            msg!("Issuance pull of {} from {} failed: {:?}", amount, from, err);
                            EngineError::TransferFailed
                        })?;
                }
                ExternalEffect::BurnIssuance { amount } => {
                    self.issuance_token.burn(custody, amount).map_err(|err| {
                        msg!("Burn of {} failed: {:?}", amount, err);
                        EngineError::TransferFailed
                    })?;
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mint of the synthetic asset this engine issues
    pub fn issuance_mint(&self) -> &Pubkey {
        &self.config.issuance_mint
    }

    pub fn collateral_assets(&self) -> &[Pubkey] {
        self.registry.assets()
    }

    pub fn is_supported(&self, asset: &Pubkey) -> bool {
        self.registry.is_supported(asset)
    }

    pub fn price_feed(&self, asset: &Pubkey) -> Option<&dyn PriceFeed> {
        self.registry.feed(asset)
    }

    pub fn usd_value(&self, asset: &Pubkey, amount: u128) -> Result<u128, EngineError> {
        let price = self.registry.price_of(asset)?;
        math::usd_value(&price, amount)
    }

    pub fn token_amount_from_usd(&self, asset: &Pubkey, usd_amount: u128) -> Result<u128, EngineError> {
        let price = self.registry.price_of(asset)?;
        math::token_amount_from_usd(&price, usd_amount)
    }

    pub fn account_collateral_value(&self, user: &Pubkey) -> Result<u128, EngineError> {
        health::account_collateral_value(&*self.ledger.borrow(), &self.registry, user)
    }

    /// (total debt, collateral value in USD)
    pub fn account_information(&self, user: &Pubkey) -> Result<(u128, u128), EngineError> {
        health::account_information(&*self.ledger.borrow(), &self.registry, user)
    }

    pub fn health_factor(&self, user: &Pubkey) -> Result<u128, EngineError> {
        health::health_factor(&*self.ledger.borrow(), &self.registry, &self.config, user)
    }

    pub fn calculate_health_factor(&self, total_debt: u128, collateral_value_usd: u128) -> Result<u128, EngineError> {
        health::calculate_health_factor(&self.config, total_debt, collateral_value_usd)
    }

    pub fn collateral_balance(&self, user: &Pubkey, asset: &Pubkey) -> u128 {
        self.ledger.borrow().collateral_of(user, asset)
    }

    pub fn debt_of(&self, user: &Pubkey) -> u128 {
        self.ledger.borrow().debt_of(user)
    }

    pub fn position(&self, user: &Pubkey) -> Option<UserPosition> {
        self.ledger.borrow().position(user).cloned()
    }

    /// Copy of the committed ledger, for persistence
    pub fn ledger_snapshot(&self) -> Ledger {
        self.ledger.borrow().clone()
    }

    /// Events of every committed operation, oldest first
    pub fn events(&self) -> Vec<EngineEvent> {
        self.journal.borrow().clone()
    }

    /// Number of operations that entered the guard, committed or not
    pub fn operation_count(&self) -> u64 {
        self.guard.operation_count()
    }
}
