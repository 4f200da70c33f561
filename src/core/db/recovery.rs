//! Transaction-Failure Recovery
//!
//! Table operations compose these helpers explicitly at the top of their
//! bodies. A recovered failure is rolled back and replaced by the
//! operation's empty outcome (`T::default()`: `None`, `false` or `()`);
//! every other error passes through unchanged.

use crate::core::db::connection::DbClient;
use crate::core::{Result, StoreError};
use tracing::warn;

/// Runs `body`, recovering from `StoreError::TransactionAborted`.
///
/// A statement issued while the transaction is already failed would keep
/// failing for the rest of the session; rolling back here returns the
/// connection to a clean state so the next call can succeed.
pub fn on_transaction_failed<T, F>(client: &DbClient, operation: &str, body: F) -> Result<T>
where
    T: Default,
    F: FnOnce() -> Result<T>,
{
    match body() {
        Err(StoreError::TransactionAborted) => {
            warn!(operation, "transaction failed, rolling back");
            client.rollback()?;
            Ok(T::default())
        }
        outcome => outcome,
    }
}

/// Absorbs the error kinds an operation expects (`recoverable`), rolling
/// back and logging a warning instead of propagating them.
pub fn recover_local<T, P>(client: &DbClient, operation: &str, outcome: Result<T>, recoverable: P) -> Result<T>
where
    T: Default,
    P: FnOnce(&StoreError) -> bool,
{
    match outcome {
        Err(err) if recoverable(&err) => {
            warn!(operation, error = %err, code = err.error_code(), "operation not applied");
            client.rollback()?;
            Ok(T::default())
        }
        outcome => outcome,
    }
}
