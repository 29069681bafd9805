pub mod reentrancy_guard;

pub use reentrancy_guard::*;
