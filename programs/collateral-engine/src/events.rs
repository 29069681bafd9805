//! Event logging for the collateral engine
//!
//! Events are borsh-serialized and written to the program log as bs58.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Vault events
    CollateralDeposited = 1,
    CollateralRedeemed = 2,

    // Debt events
    DebtMinted = 10,
    DebtBurned = 11,

    // Liquidation events
    PositionLiquidated = 20,
}

pub trait Event: BorshSerialize {
    fn event_type() -> EventType;

    fn emit(&self) {
        msg!("COLLATERAL_ENGINE_EVENT");
        msg!("TYPE:{:?}", Self::event_type());

        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

/// define_event!(EventName { field: type, ... })
#[macro_export]
macro_rules! define_event {
    ($name:ident { $($field:ident: $type:ty),* $(,)? }) => {
        #[derive(::borsh::BorshSerialize, ::borsh::BorshDeserialize, Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $type,)*
        }

        impl $crate::events::Event for $name {
            fn event_type() -> $crate::events::EventType {
                $crate::events::EventType::$name
            }
        }
    };
}

define_event!(CollateralDeposited {
    user: Pubkey,
    asset: Pubkey,
    amount: u128,
});

define_event!(CollateralRedeemed {
    from: Pubkey,
    to: Pubkey,
    asset: Pubkey,
    amount: u128,
});

define_event!(DebtMinted {
    user: Pubkey,
    amount: u128,
});

define_event!(DebtBurned {
    on_behalf_of: Pubkey,
    payer: Pubkey,
    amount: u128,
});

define_event!(PositionLiquidated {
    victim: Pubkey,
    liquidator: Pubkey,
    asset: Pubkey,
    debt_covered: u128,
    collateral_seized: u128,
});

/// Journal entry for any engine event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CollateralDeposited(CollateralDeposited),
    CollateralRedeemed(CollateralRedeemed),
    DebtMinted(DebtMinted),
    DebtBurned(DebtBurned),
    PositionLiquidated(PositionLiquidated),
}

impl EngineEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollateralDeposited(_) => CollateralDeposited::event_type(),
            Self::CollateralRedeemed(_) => CollateralRedeemed::event_type(),
            Self::DebtMinted(_) => DebtMinted::event_type(),
            Self::DebtBurned(_) => DebtBurned::event_type(),
            Self::PositionLiquidated(_) => PositionLiquidated::event_type(),
        }
    }

    pub fn emit(&self) {
        match self {
            Self::CollateralDeposited(event) => event.emit(),
            Self::CollateralRedeemed(event) => event.emit(),
            Self::DebtMinted(event) => event.emit(),
            Self::DebtBurned(event) => event.emit(),
            Self::PositionLiquidated(event) => event.emit(),
        }
    }
}
