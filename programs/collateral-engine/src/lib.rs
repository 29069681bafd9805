// Over-collateralized synthetic asset issuance engine
// Native Solana types - NO ANCHOR

pub mod debt_ledger;
pub mod engine;
pub mod error;
pub mod events;
pub mod health;
pub mod instructions;
pub mod math;
pub mod oracle;
pub mod processor;
pub mod security;
pub mod state;
pub mod token;
pub mod vault;

pub use engine::{CollateralEngine, LiquidationOutcome};
pub use error::EngineError;
pub use processor::process_instruction;

// Declare program ID
solana_program::declare_id!("CoLLateraLEngine111111111111111111111111111");
