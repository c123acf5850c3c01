//! Transaction boundary over registry state
//!
//! Each public entry point of a registry is one transaction. `transact` runs
//! the operation against a staged copy of the state while holding the state
//! mutex, and swaps the copy in only when the operation returns `Ok`. A
//! failure at any point, including a value transfer attempted as the last
//! step, therefore leaves the committed state untouched and no second
//! operation can observe a partially applied one.
//!
//! The staged copy is a full clone of `S`, so a transaction costs time in the
//! size of the state, journals included. Drain journals regularly to keep
//! that bounded.

use parking_lot::Mutex;

/// Serialized, all-or-nothing access to `S`.
#[derive(Debug, Default)]
pub struct Ledger<S> {
    state: Mutex<S>,
}

impl<S: Clone> Ledger<S> {
    /// Wrap initial state
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Run `op` as one atomic transaction
    pub fn transact<T, E>(&self, op: impl FnOnce(&mut S) -> Result<T, E>) -> Result<T, E> {
        let mut committed = self.state.lock();
        let mut staged = committed.clone();
        let outcome = op(&mut staged)?;
        *committed = staged;
        Ok(outcome)
    }

    /// Read committed state
    pub fn read<T>(&self, view: impl FnOnce(&S) -> T) -> T {
        view(&self.state.lock())
    }

    /// Unwrap the committed state
    pub fn into_inner(self) -> S {
        self.state.into_inner()
    }
}
