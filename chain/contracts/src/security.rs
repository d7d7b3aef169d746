//! Reentrancy protection for the ledger's mutating entry points
//!
//! Outbound transfers hand control to external token contracts and
//! recipients. The lock records which entry point is mid-flight so that a
//! nested entry is refused instead of observing half-applied state.

use tracing::warn;

use crate::errors::LedgerError;

/// Mutating entry points of the cell ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    CreateCell,
    RetireAndRelease,
}

/// Single-holder lock over the ledger's mutating entry points.
///
/// Held for the duration of one `create_cell` or `retire_and_release`,
/// including the outbound asset movement.
#[derive(Debug, Clone, Default)]
pub struct EntryLock {
    holder: Option<EntryPoint>,
}

impl EntryLock {
    pub fn new() -> Self {
        Self { holder: None }
    }

    /// Take the lock for `entry`, or fail with `Reentrancy` if any entry
    /// point already holds it.
    pub fn enter(&mut self, entry: EntryPoint) -> Result<(), LedgerError> {
        if let Some(current) = self.holder {
            warn!(?current, attempted = ?entry, "reentrant ledger call refused");
            return Err(LedgerError::Reentrancy);
        }
        self.holder = Some(entry);
        Ok(())
    }

    /// Release the lock. Must be called on every exit path after `enter`.
    pub fn exit(&mut self) {
        self.holder = None;
    }

    /// Entry point currently holding the lock, if any.
    pub fn holder(&self) -> Option<EntryPoint> {
        self.holder
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_exit() {
        let mut lock = EntryLock::new();
        assert!(!lock.is_held());

        lock.enter(EntryPoint::CreateCell).unwrap();
        assert_eq!(lock.holder(), Some(EntryPoint::CreateCell));

        lock.exit();
        assert!(!lock.is_held());
    }

    #[test]
    fn test_nested_entry_refused() {
        let mut lock = EntryLock::new();
        lock.enter(EntryPoint::RetireAndRelease).unwrap();

        assert_eq!(
            lock.enter(EntryPoint::RetireAndRelease),
            Err(LedgerError::Reentrancy)
        );
        assert_eq!(
            lock.enter(EntryPoint::CreateCell),
            Err(LedgerError::Reentrancy)
        );
        // The first holder is untouched by the refused attempts
        assert_eq!(lock.holder(), Some(EntryPoint::RetireAndRelease));
    }

    #[test]
    fn test_reenter_after_exit() {
        let mut lock = EntryLock::new();
        lock.enter(EntryPoint::CreateCell).unwrap();
        lock.exit();
        assert!(lock.enter(EntryPoint::RetireAndRelease).is_ok());
    }
}
