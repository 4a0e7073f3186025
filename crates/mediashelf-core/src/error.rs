//! Error types for mediashelf.

use std::thread::ThreadId;

/// Errors reported when a transaction boundary is misused.
///
/// None of these leave the owning collection in a modified state: the
/// offending call is ignored and the error only reports what happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The handle was opened on a different thread than the caller's.
    #[error("transaction opened on thread {expected:?} cannot be closed from thread {actual:?}")]
    ThreadMismatch {
        /// Thread that opened the transaction.
        expected: ThreadId,
        /// Thread that tried to close it.
        actual: ThreadId,
    },

    /// The calling thread has no open transaction.
    #[error("no transaction is open on this thread")]
    NoActiveTransaction,
}

/// A specialized Result type for transaction operations.
pub type Result<T> = std::result::Result<T, TransactionError>;
