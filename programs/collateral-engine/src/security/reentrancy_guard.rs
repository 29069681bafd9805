//! Reentrancy Guard
//!
//! Serializes state-mutating engine operations. A token callback that
//! re-enters the engine while an operation is in flight is rejected.

use std::cell::Cell;

use solana_program::msg;

use crate::error::EngineError;

/// Reentrancy guard states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReentrancyState {
    /// Not entered - ready for new operation
    NotEntered = 0,
    /// Entered - operation in progress
    Entered = 1,
}

#[derive(Debug)]
pub struct ReentrancyGuard {
    state: Cell<ReentrancyState>,
    current_operation: Cell<Option<&'static str>>,
    operation_count: Cell<u64>,
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            state: Cell::new(ReentrancyState::NotEntered),
            current_operation: Cell::new(None),
            operation_count: Cell::new(0),
        }
    }

    /// Enter guarded section. The returned context exits on drop, on every
    /// path out of the operation.
    pub fn enter(&self, operation: &'static str) -> Result<ReentrancyContext<'_>, EngineError> {
        match self.state.get() {
            ReentrancyState::NotEntered => {
                self.state.set(ReentrancyState::Entered);
                self.current_operation.set(Some(operation));
                self.operation_count.set(self.operation_count.get() + 1);
                Ok(ReentrancyContext { guard: self })
            }
            ReentrancyState::Entered => {
                msg!(
                    "Reentrancy detected: {} while {} in progress",
                    operation,
                    self.current_operation.get().unwrap_or("unknown")
                );
                Err(EngineError::ReentrancyDetected)
            }
        }
    }

    fn exit(&self) {
        self.state.set(ReentrancyState::NotEntered);
        self.current_operation.set(None);
    }

    /// Check if currently guarded
    pub fn is_entered(&self) -> bool {
        self.state.get() == ReentrancyState::Entered
    }

    pub fn state(&self) -> ReentrancyState {
        self.state.get()
    }

    /// Number of operations that entered the guard
    pub fn operation_count(&self) -> u64 {
        self.operation_count.get()
    }
}

/// Guard context for automatic cleanup
pub struct ReentrancyContext<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyContext<'_> {
    fn drop(&mut self) {
        self.guard.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_entry_rejected() {
        let guard = ReentrancyGuard::new();
        let outer = guard.enter("deposit_collateral").unwrap();
        assert!(guard.is_entered());

        assert!(matches!(
            guard.enter("mint_debt"),
            Err(EngineError::ReentrancyDetected)
        ));

        drop(outer);
        assert_eq!(guard.state(), ReentrancyState::NotEntered);
        assert!(guard.enter("mint_debt").is_ok());
        assert_eq!(guard.operation_count(), 2);
    }

    #[test]
    fn test_released_on_error_path() {
        fn failing(guard: &ReentrancyGuard) -> Result<(), EngineError> {
            let _entered = guard.enter("redeem_collateral")?;
            Err(EngineError::InsufficientCollateral)
        }

        let guard = ReentrancyGuard::new();
        assert_eq!(failing(&guard), Err(EngineError::InsufficientCollateral));
        assert!(!guard.is_entered());
    }
}
