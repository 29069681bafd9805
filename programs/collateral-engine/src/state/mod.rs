pub mod engine_config;
pub mod ledger;
pub mod registry;

pub use engine_config::*;
pub use ledger::*;
pub use registry::*;
