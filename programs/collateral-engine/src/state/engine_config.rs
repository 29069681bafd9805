use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{error::EngineError, math::PRECISION};

/// Risk parameters and identities of one engine instance
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Identity holding collateral custody and the issuance mint/burn authority
    pub engine_authority: Pubkey,

    /// Mint of the issued token
    pub issuance_mint: Pubkey,

    /// Share of collateral value counted toward solvency (default: 50)
    /// Read as liquidation_threshold / liquidation_precision
    pub liquidation_threshold: u128,

    /// Extra collateral paid to liquidators (default: 10, i.e. 10%)
    pub liquidation_bonus: u128,

    /// Denominator for threshold and bonus (default: 100)
    pub liquidation_precision: u128,

    /// Health factor floor, fixed point 18 decimals (default: 1.0)
    pub min_health_factor: u128,
}

impl EngineConfig {
    pub const DISCRIMINATOR: [u8; 8] = [69, 78, 71, 95, 67, 79, 78, 70]; // "ENG_CONF"

    pub const LEN: usize = 8 + // discriminator
        32 + // engine_authority
        32 + // issuance_mint
        16 + // liquidation_threshold
        16 + // liquidation_bonus
        16 + // liquidation_precision
        16; // min_health_factor

    /// Create default configuration (200% overcollateralized, 10% bonus)
    pub fn new(engine_authority: Pubkey, issuance_mint: Pubkey) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            engine_authority,
            issuance_mint,
            liquidation_threshold: 50,
            liquidation_bonus: 10,
            liquidation_precision: 100,
            min_health_factor: PRECISION,
        }
    }

    pub fn with_liquidation_threshold(mut self, threshold: u128) -> Self {
        self.liquidation_threshold = threshold;
        self
    }

    pub fn with_liquidation_bonus(mut self, bonus: u128) -> Self {
        self.liquidation_bonus = bonus;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.discriminator != Self::DISCRIMINATOR {
            msg!("Bad config discriminator");
            return Err(EngineError::InvalidConfig);
        }

        if self.liquidation_precision == 0 {
            msg!("Liquidation precision must be non-zero");
            return Err(EngineError::InvalidConfig);
        }

        if self.liquidation_threshold == 0 || self.liquidation_threshold > self.liquidation_precision {
            msg!(
                "Liquidation threshold {} outside (0, {}]",
                self.liquidation_threshold,
                self.liquidation_precision
            );
            return Err(EngineError::InvalidConfig);
        }

        if self.liquidation_bonus >= self.liquidation_precision {
            msg!("Liquidation bonus {} too large", self.liquidation_bonus);
            return Err(EngineError::InvalidConfig);
        }

        if self.min_health_factor == 0 {
            msg!("Minimum health factor must be non-zero");
            return Err(EngineError::InvalidConfig);
        }

        Ok(())
    }
}
