//! Token program interfaces
//!
//! Collateral assets and the issuance token live outside the engine. The
//! engine only ever touches them through these traits; any `Err` returned by
//! an implementation counts as a failed transfer, mint or burn.

use std::rc::Rc;

use solana_program::{entrypoint::ProgramResult, pubkey::Pubkey};

/// Token program holding every supported collateral mint
pub trait CollateralToken {
    /// Pull `amount` of `asset` from `from` into `to` (engine custody)
    fn transfer_from(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult;

    /// Send `amount` of `asset` out of engine custody `from` to `to`
    fn transfer(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult;
}

/// The value-pegged token issued against collateral. Mint and burn
/// authority belong to the engine alone.
pub trait IssuanceToken {
    fn mint(&self, to: &Pubkey, amount: u128) -> ProgramResult;

    /// Destroy `amount` from the engine's own balance
    fn burn(&self, holder: &Pubkey, amount: u128) -> ProgramResult;

    fn transfer_from(&self, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult;
}

impl<T: CollateralToken + ?Sized> CollateralToken for Rc<T> {
    fn transfer_from(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        (**self).transfer_from(asset, from, to, amount)
    }

    fn transfer(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        (**self).transfer(asset, from, to, amount)
    }
}

impl<T: IssuanceToken + ?Sized> IssuanceToken for Rc<T> {
    fn mint(&self, to: &Pubkey, amount: u128) -> ProgramResult {
        (**self).mint(to, amount)
    }

    fn burn(&self, holder: &Pubkey, amount: u128) -> ProgramResult {
        (**self).burn(holder, amount)
    }

    fn transfer_from(&self, from: &Pubkey, to: &Pubkey, amount: u128) -> ProgramResult {
        (**self).transfer_from(from, to, amount)
    }
}

/// Token side effect staged by an operation, executed only after every
/// ledger check of that operation passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalEffect {
    PullCollateral { asset: Pubkey, from: Pubkey, amount: u128 },
    ReleaseCollateral { asset: Pubkey, to: Pubkey, amount: u128 },
    MintIssuance { to: Pubkey, amount: u128 },
    PullIssuance { from: Pubkey, amount: u128 },
    BurnIssuance { amount: u128 },
}

impl ExternalEffect {
    /// Inbound pulls settle first, then burns, then outbound mints and releases
    pub fn settlement_rank(&self) -> u8 {
        match self {
            Self::PullCollateral { .. } | Self::PullIssuance { .. } => 0,
            Self::BurnIssuance { .. } => 1,
            Self::MintIssuance { .. } | Self::ReleaseCollateral { .. } => 2,
        }
    }
}
