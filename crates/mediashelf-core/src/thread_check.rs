//! Thread affinity checks.
//!
//! A transaction opened on one thread queues work that only that thread may
//! commit or discard. [`ThreadAffinity`] remembers the opening thread so a
//! later call can be verified against it.
//!
//! ```
//! use mediashelf_core::ThreadAffinity;
//!
//! let opened_on = ThreadAffinity::current();
//! assert!(opened_on.check().is_ok());
//!
//! let elsewhere = std::thread::spawn(move || opened_on.check()).join().unwrap();
//! assert!(elsewhere.is_err());
//! ```

use std::thread::ThreadId;

use crate::error::TransactionError;

/// The thread a value is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// `Err(ThreadMismatch)` unless called on the bound thread.
    pub fn check(&self) -> Result<(), TransactionError> {
        let actual = std::thread::current().id();
        if actual == self.thread_id {
            return Ok(());
        }
        Err(TransactionError::ThreadMismatch {
            expected: self.thread_id,
            actual,
        })
    }
}
