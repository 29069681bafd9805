use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Collateral asset is not supported")]
    UnsupportedAsset,

    #[error("Asset and price feed lists differ in length")]
    LengthMismatch,

    #[error("Token transfer failed")]
    TransferFailed,

    #[error("Issuance token mint failed")]
    MintFailed,

    #[error("Insufficient collateral")]
    InsufficientCollateral,

    #[error("Insufficient debt")]
    InsufficientDebt,

    #[error("Health factor broken: {0}")]
    HealthFactorBroken(u128),

    #[error("Health factor is above the liquidation minimum")]
    HealthFactorOk,

    #[error("Liquidation did not improve the health factor")]
    HealthFactorNotImproved,

    #[error("Reentrant call into a guarded operation")]
    ReentrancyDetected,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid oracle price")]
    InvalidPrice,

    #[error("Price data stale")]
    PriceDataStale,

    #[error("Collateral asset registered twice")]
    DuplicateAsset,

    #[error("Invalid engine configuration")]
    InvalidConfig,
}

impl EngineError {
    /// Stable code carried in `ProgramError::Custom`.
    pub fn code(&self) -> u32 {
        match self {
            Self::ZeroAmount => 0,
            Self::UnsupportedAsset => 1,
            Self::LengthMismatch => 2,
            Self::TransferFailed => 3,
            Self::MintFailed => 4,
            Self::InsufficientCollateral => 5,
            Self::InsufficientDebt => 6,
            Self::HealthFactorBroken(_) => 7,
            Self::HealthFactorOk => 8,
            Self::HealthFactorNotImproved => 9,
            Self::ReentrancyDetected => 10,
            Self::ArithmeticOverflow => 11,
            Self::DivisionByZero => 12,
            Self::InvalidPrice => 13,
            Self::PriceDataStale => 14,
            Self::DuplicateAsset => 15,
            Self::InvalidConfig => 16,
        }
    }
}

impl From<EngineError> for ProgramError {
    fn from(e: EngineError) -> Self {
        ProgramError::Custom(e.code())
    }
}

impl<T> DecodeError<T> for EngineError {
    fn type_of() -> &'static str {
        "EngineError"
    }
}
