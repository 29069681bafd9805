use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

/// Engine instructions. Wire format is one tag byte followed by the borsh
/// payload of the variant. The caller identity is supplied by the host.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EngineInstruction {
    /// Deposit collateral and mint debt against it
    DepositCollateralAndMint {
        asset: Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    },

    DepositCollateral {
        asset: Pubkey,
        amount: u128,
    },

    /// Burn debt, then withdraw collateral
    RedeemCollateralForDebt {
        asset: Pubkey,
        collateral_amount: u128,
        debt_amount: u128,
    },

    RedeemCollateral {
        asset: Pubkey,
        amount: u128,
    },

    MintDebt {
        amount: u128,
    },

    BurnDebt {
        amount: u128,
    },

    /// Cover part of an unhealthy position's debt for its collateral
    Liquidate {
        asset: Pubkey,
        victim: Pubkey,
        debt_to_cover: u128,
    },
}

impl EngineInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&variant, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match variant {
            0 => {
                let payload: AssetWithDebtPayload = decode(rest)?;
                Self::DepositCollateralAndMint {
                    asset: payload.asset,
                    collateral_amount: payload.collateral_amount,
                    debt_amount: payload.debt_amount,
                }
            }
            1 => {
                let payload: AssetAmountPayload = decode(rest)?;
                Self::DepositCollateral {
                    asset: payload.asset,
                    amount: payload.amount,
                }
            }
            2 => {
                let payload: AssetWithDebtPayload = decode(rest)?;
                Self::RedeemCollateralForDebt {
                    asset: payload.asset,
                    collateral_amount: payload.collateral_amount,
                    debt_amount: payload.debt_amount,
                }
            }
            3 => {
                let payload: AssetAmountPayload = decode(rest)?;
                Self::RedeemCollateral {
                    asset: payload.asset,
                    amount: payload.amount,
                }
            }
            4 => {
                let payload: AmountPayload = decode(rest)?;
                Self::MintDebt { amount: payload.amount }
            }
            5 => {
                let payload: AmountPayload = decode(rest)?;
                Self::BurnDebt { amount: payload.amount }
            }
            6 => {
                let payload: LiquidatePayload = decode(rest)?;
                Self::Liquidate {
                    asset: payload.asset,
                    victim: payload.victim,
                    debt_to_cover: payload.debt_to_cover,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        let (tag, payload) = match *self {
            Self::DepositCollateralAndMint {
                asset,
                collateral_amount,
                debt_amount,
            } => (
                0u8,
                encode(&AssetWithDebtPayload {
                    asset,
                    collateral_amount,
                    debt_amount,
                })?,
            ),
            Self::DepositCollateral { asset, amount } => (1, encode(&AssetAmountPayload { asset, amount })?),
            Self::RedeemCollateralForDebt {
                asset,
                collateral_amount,
                debt_amount,
            } => (
                2,
                encode(&AssetWithDebtPayload {
                    asset,
                    collateral_amount,
                    debt_amount,
                })?,
            ),
            Self::RedeemCollateral { asset, amount } => (3, encode(&AssetAmountPayload { asset, amount })?),
            Self::MintDebt { amount } => (4, encode(&AmountPayload { amount })?),
            Self::BurnDebt { amount } => (5, encode(&AmountPayload { amount })?),
            Self::Liquidate {
                asset,
                victim,
                debt_to_cover,
            } => (
                6,
                encode(&LiquidatePayload {
                    asset,
                    victim,
                    debt_to_cover,
                })?,
            ),
        };

        let mut data = Vec::with_capacity(1 + payload.len());
        data.push(tag);
        data.extend_from_slice(&payload);
        Ok(data)
    }
}

fn decode<T: BorshDeserialize>(data: &[u8]) -> Result<T, ProgramError> {
    T::try_from_slice(data).map_err(|_| ProgramError::InvalidInstructionData)
}

fn encode<T: BorshSerialize>(payload: &T) -> Result<Vec<u8>, ProgramError> {
    payload.try_to_vec().map_err(|_| ProgramError::InvalidInstructionData)
}

// Payload structs shared between variants
#[derive(BorshSerialize, BorshDeserialize)]
struct AssetWithDebtPayload {
    asset: Pubkey,
    collateral_amount: u128,
    debt_amount: u128,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct AssetAmountPayload {
    asset: Pubkey,
    amount: u128,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct AmountPayload {
    amount: u128,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct LiquidatePayload {
    asset: Pubkey,
    victim: Pubkey,
    debt_to_cover: u128,
}
