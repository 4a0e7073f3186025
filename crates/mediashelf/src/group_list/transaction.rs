//! Per-thread transactions.
//!
//! While a thread holds an open transaction, every mutation it issues on the
//! list is queued as an [`Action`] instead of running. Ending the outermost
//! transaction drains the queue in order, collects the notifications of every
//! action into one deduplicated buffer, and only then publishes them.

use std::collections::VecDeque;
use std::fmt;

use mediashelf_core::{Result, ThreadAffinity, TransactionError};

use super::notify::NotificationBuffer;
use super::{GroupItem, GroupList};
use crate::compare::SharedComparer;

/// A deferred mutation.
pub(crate) enum Action<T> {
    Add(T),
    Remove(T),
    Clear,
    Reset,
    ResetItem(T),
    AddGroupBy(SharedComparer<T>),
    RemoveGroupBy(SharedComparer<T>),
    AddSortBy(SharedComparer<T>),
    RemoveSortBy(SharedComparer<T>),
    ResetComparer(SharedComparer<T>),
}

impl<T> Action<T> {
    /// Short name for logging.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "add",
            Action::Remove(_) => "remove",
            Action::Clear => "clear",
            Action::Reset => "reset",
            Action::ResetItem(_) => "reset_item",
            Action::AddGroupBy(_) => "add_group_by",
            Action::RemoveGroupBy(_) => "remove_group_by",
            Action::AddSortBy(_) => "add_sort_by",
            Action::RemoveSortBy(_) => "remove_sort_by",
            Action::ResetComparer(_) => "reset_comparer",
        }
    }

    /// Whether the action may touch a large part of the tree.
    pub(crate) fn is_bulk(&self) -> bool {
        !matches!(self, Action::Add(_) | Action::Remove(_) | Action::ResetItem(_))
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one thread's open transaction.
pub(crate) struct Transaction<T> {
    /// Open `begin` calls not yet matched by `end`.
    pub(crate) depth: usize,
    /// Set while the queue is being drained; mutations issued meanwhile run
    /// immediately.
    pub(crate) draining: bool,
    pub(crate) actions: VecDeque<Action<T>>,
    pub(crate) notifications: NotificationBuffer,
}

impl<T> Transaction<T> {
    pub(crate) fn new() -> Self {
        Self {
            depth: 0,
            draining: false,
            actions: VecDeque::new(),
            notifications: NotificationBuffer::new(),
        }
    }
}

/// Proof of an open transaction, returned by
/// [`GroupList::begin_transaction`].
///
/// Must be passed back to [`GroupList::end_transaction`] or
/// [`GroupList::cancel_transaction`] on the thread that opened it.
#[must_use = "a transaction stays open until its handle is ended or cancelled"]
#[derive(Debug)]
pub struct TransactionHandle {
    affinity: ThreadAffinity,
    depth: usize,
}

impl TransactionHandle {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            affinity: ThreadAffinity::current(),
            depth,
        }
    }

    /// Nesting level this handle opened, 1 for the outermost.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Fails unless called from the thread that opened the transaction.
    pub(crate) fn check_thread(&self) -> Result<()> {
        self.affinity.check()
    }
}

/// Scoped transaction: ends on drop.
///
/// ```
/// use mediashelf::GroupList;
///
/// let list = GroupList::<u32>::new();
/// {
///     let _tx = list.transaction();
///     list.add(3);
///     list.add(1);
///     assert!(list.is_empty());
/// }
/// assert_eq!(list.len(), 2);
/// ```
pub struct TransactionGuard<'a, T: GroupItem> {
    list: &'a GroupList<T>,
    handle: Option<TransactionHandle>,
}

impl<'a, T: GroupItem> TransactionGuard<'a, T> {
    pub(crate) fn new(list: &'a GroupList<T>) -> Self {
        Self {
            list,
            handle: Some(list.begin_transaction()),
        }
    }

    /// Ends the transaction now.
    pub fn commit(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.list.end_transaction(handle),
            None => Err(TransactionError::NoActiveTransaction),
        }
    }

    /// Discards every queued action and notification.
    pub fn cancel(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.list.cancel_transaction(handle),
            None => Err(TransactionError::NoActiveTransaction),
        }
    }
}

impl<T: GroupItem> Drop for TransactionGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(error) = self.list.end_transaction(handle) {
                tracing::debug!(
                    target: mediashelf_core::logging::targets::TRANSACTION,
                    %error,
                    "transaction guard dropped without an open transaction"
                );
            }
        }
    }
}
