//! Hierarchical grouping of a flat item collection.
//!
//! A [`GroupList`] arranges its items in a tree. Each *group-by* comparer
//! adds one level: the children of a node at depth `d` partition that node's
//! items by `group_bys[d]`, and siblings are kept in ascending group order.
//! Items live only in leaves, sorted by the *sort-by* comparers.
//!
//! Every structural change is announced on [`GroupList::changed`] as a
//! [`NodeChange`] for the mutated node and then for each of its ancestors.
//! Within a transaction those changes are collected, deduplicated and
//! published once the outermost transaction ends.
//!
//! # Example
//!
//! ```
//! use mediashelf::GroupList;
//! use mediashelf::compare::{FnComparer, KeyComparer};
//!
//! let list = GroupList::builder()
//!     .group_by(KeyComparer::shared(|s: &String| s.chars().next().unwrap_or(' ')))
//!     .sort_by(FnComparer::shared(|a: &String, b: &String| a.cmp(b)))
//!     .build();
//!
//! for fruit in ["Banana", "Apple", "Avocado"] {
//!     list.add(fruit.to_string());
//! }
//!
//! let groups = list.children(list.root());
//! assert_eq!(list.key(groups[0]).as_deref(), Some("A"));
//! assert_eq!(list.node_items(groups[0]), ["Apple", "Avocado"]);
//! ```
//!
//! # Threading
//!
//! The list is `Send + Sync`; cloning it yields another handle to the same
//! tree. Writers are serialized by a lock and signals are emitted with no
//! lock held, so slots may read or mutate the list. Transactions belong to
//! the thread that opened them.

mod debug;
mod notify;
mod transaction;
mod tree;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use mediashelf_core::logging::{span_names, targets};
use mediashelf_core::{
    ConnectionGuard, ConnectionId, ListChange, ObservableList, PerfSpan, Result, Signal,
    TransactionError,
};
use parking_lot::{Mutex, RwLock};
use slotmap::new_key_type;

use crate::compare::{same_comparer, SharedComparer};

pub use debug::GroupTreeDebug;
pub use notify::{NodeChange, NodeProperty, PropertySet};
pub use transaction::{TransactionGuard, TransactionHandle};

use notify::NotificationBuffer;
use transaction::{Action, Transaction};
use tree::Tree;

new_key_type! {
    /// Identifies a node of a [`GroupList`].
    ///
    /// Ids are never reused while the list lives; an id whose group was
    /// pruned simply stops resolving.
    pub struct NodeId;
}

/// Bounds required of items held by a [`GroupList`].
///
/// Items are located by equality, cloned into read results, and shared
/// across threads.
pub trait GroupItem: Clone + PartialEq + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Send + Sync + 'static> GroupItem for T {}

/// Summary of a group node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHeader {
    /// The node.
    pub id: NodeId,
    /// Distance from the root.
    pub depth: usize,
    /// Label from the group-by that formed the group.
    pub key: Option<String>,
    /// Items in the group.
    pub count: usize,
}

/// One entry of a flattened structure.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureEntry<T> {
    /// A group header, followed by the group's own entries.
    Group(GroupHeader),
    /// An item of a leaf.
    Item(T),
}

impl<T> StructureEntry<T> {
    /// The item, if this entry is one.
    pub fn as_item(&self) -> Option<&T> {
        match self {
            StructureEntry::Item(item) => Some(item),
            StructureEntry::Group(_) => None,
        }
    }

    /// The group header, if this entry is one.
    pub fn as_group(&self) -> Option<&GroupHeader> {
        match self {
            StructureEntry::Group(header) => Some(header),
            StructureEntry::Item(_) => None,
        }
    }
}

/// Configuration for a [`GroupList`].
#[derive(Debug, Clone)]
pub struct GroupListConfig {
    /// Name used in log output.
    pub name: String,
    /// Check comparers for antisymmetry while inserting and log violations.
    pub validate_comparators: bool,
}

impl Default for GroupListConfig {
    fn default() -> Self {
        Self {
            name: "group-list".to_string(),
            validate_comparators: cfg!(debug_assertions),
        }
    }
}

impl GroupListConfig {
    /// Default configuration with a custom name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Builder for a [`GroupList`] with initial criteria.
pub struct GroupListBuilder<T> {
    config: GroupListConfig,
    group_bys: Vec<SharedComparer<T>>,
    sort_bys: Vec<SharedComparer<T>>,
}

impl<T: GroupItem> Default for GroupListBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GroupItem> GroupListBuilder<T> {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: GroupListConfig::default(),
            group_bys: Vec::new(),
            sort_bys: Vec::new(),
        }
    }

    /// Sets the whole configuration.
    pub fn config(mut self, config: GroupListConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Enables or disables comparer validation.
    pub fn validate_comparators(mut self, validate: bool) -> Self {
        self.config.validate_comparators = validate;
        self
    }

    /// Appends a grouping level.
    pub fn group_by(mut self, comparer: SharedComparer<T>) -> Self {
        self.group_bys.push(comparer);
        self
    }

    /// Appends a sort criterion.
    pub fn sort_by(mut self, comparer: SharedComparer<T>) -> Self {
        self.sort_bys.push(comparer);
        self
    }

    /// Builds the list.
    pub fn build(self) -> GroupList<T> {
        let list = GroupList::with_config(self.config);
        for comparer in self.group_bys {
            list.add_group_by(comparer);
        }
        for comparer in self.sort_bys {
            list.add_sort_by(comparer);
        }
        list
    }
}

type CriteriaSubscription<T> = ConnectionGuard<ListChange<SharedComparer<T>>>;

/// Reset-signal bookkeeping left over from applying an action.
enum HookChange<T> {
    Connect(SharedComparer<T>),
    Disconnect(SharedComparer<T>),
}

/// A reset-signal connection on a resettable comparer.
struct ResetHook<T> {
    comparer: SharedComparer<T>,
    connection: ConnectionId,
}

struct Shared<T: GroupItem> {
    config: GroupListConfig,
    weak_self: Weak<Shared<T>>,
    tree: RwLock<Tree<T>>,
    transactions: Mutex<HashMap<ThreadId, Transaction<T>>>,
    changed: Signal<NodeChange>,
    reset_hooks: Mutex<Vec<ResetHook<T>>>,
    group_by_source: Mutex<Option<CriteriaSubscription<T>>>,
    sort_by_source: Mutex<Option<CriteriaSubscription<T>>>,
}

impl<T: GroupItem> Shared<T> {
    /// Queues `action` if this thread has an open transaction, otherwise
    /// runs it and publishes the result.
    fn submit(&self, action: Action<T>) {
        let thread = thread::current().id();
        {
            let mut transactions = self.transactions.lock();
            if let Some(transaction) = transactions.get_mut(&thread) {
                if !transaction.draining {
                    tracing::trace!(
                        target: targets::TRANSACTION,
                        list = %self.config.name,
                        action = action.name(),
                        queued = transaction.actions.len() + 1,
                        "queued action"
                    );
                    transaction.actions.push_back(action);
                    return;
                }
            }
        }
        let changes = self.execute(action);
        self.route(changes);
    }

    /// Hands notifications to this thread's transaction, or publishes them.
    fn route(&self, changes: NotificationBuffer) {
        if changes.is_empty() {
            return;
        }
        let thread = thread::current().id();
        {
            let mut transactions = self.transactions.lock();
            if let Some(transaction) = transactions.get_mut(&thread) {
                transaction.notifications.extend(changes);
                return;
            }
        }
        self.publish(changes);
    }

    fn publish(&self, changes: NotificationBuffer) {
        tracing::trace!(
            target: targets::GROUP_LIST,
            list = %self.config.name,
            count = changes.len(),
            "publishing notifications"
        );
        for change in changes.into_changes() {
            self.changed.emit(change);
        }
    }

    /// Runs one action under its own write lock.
    fn execute(&self, action: Action<T>) -> NotificationBuffer {
        self.execute_batch(std::iter::once(action))
    }

    /// Runs `actions` in order under a single write lock, so no reader or
    /// other writer sees the tree between two of them. Reset hooks are
    /// updated once the lock is released.
    fn execute_batch(&self, actions: impl IntoIterator<Item = Action<T>>) -> NotificationBuffer {
        let mut out = NotificationBuffer::new();
        let mut hooks = Vec::new();
        {
            let mut tree = self.tree.write();
            for action in actions {
                if let Some(change) = self.apply(&mut tree, action, &mut out) {
                    hooks.push(change);
                }
            }
        }

        for change in hooks {
            match change {
                HookChange::Connect(comparer) => self.hook_reset(&comparer),
                HookChange::Disconnect(comparer) => self.unhook_reset(&comparer),
            }
        }
        out
    }

    /// Applies one action to a locked tree.
    fn apply(
        &self,
        tree: &mut Tree<T>,
        action: Action<T>,
        out: &mut NotificationBuffer,
    ) -> Option<HookChange<T>> {
        let _perf = action.is_bulk().then(|| PerfSpan::new(span_names::REGROUP));
        tracing::trace!(
            target: targets::GROUP_LIST,
            list = %self.config.name,
            action = action.name(),
            "applying action"
        );

        match action {
            Action::Add(item) => {
                tree.add(item, out);
            }
            Action::Remove(item) => {
                if !tree.remove(&item, out) {
                    tracing::debug!(
                        target: targets::GROUP_LIST,
                        list = %self.config.name,
                        "remove ignored: item not present"
                    );
                }
            }
            Action::Clear => tree.clear(out),
            Action::Reset => tree.reset(out),
            Action::ResetItem(item) => {
                tree.reset_item(&item, out);
            }
            Action::AddGroupBy(comparer) => {
                tree.add_group_by(comparer.clone(), out);
                return Some(HookChange::Connect(comparer));
            }
            Action::RemoveGroupBy(comparer) => {
                if tree.remove_group_by(&comparer, out) && !tree.uses_comparer(&comparer) {
                    return Some(HookChange::Disconnect(comparer));
                }
            }
            Action::AddSortBy(comparer) => {
                tree.add_sort_by(comparer.clone(), out);
                return Some(HookChange::Connect(comparer));
            }
            Action::RemoveSortBy(comparer) => {
                if tree.remove_sort_by(&comparer, out) && !tree.uses_comparer(&comparer) {
                    return Some(HookChange::Disconnect(comparer));
                }
            }
            Action::ResetComparer(comparer) => {
                if !tree.reset_comparer(&comparer, out) {
                    tracing::debug!(
                        target: targets::GROUP_LIST,
                        list = %self.config.name,
                        "reset from a comparer no longer in use"
                    );
                }
            }
        }
        None
    }

    /// Connects to a resettable comparer's reset signal, once per comparer.
    fn hook_reset(&self, comparer: &SharedComparer<T>) {
        let Some(resettable) = comparer.as_resettable() else {
            return;
        };
        let mut hooks = self.reset_hooks.lock();
        if hooks.iter().any(|hook| same_comparer(&hook.comparer, comparer)) {
            return;
        }

        let shared = self.weak_self.clone();
        let target = Arc::downgrade(comparer);
        let connection = resettable.reset_signal().connect(move |_| {
            if let (Some(shared), Some(comparer)) = (shared.upgrade(), target.upgrade()) {
                shared.submit(Action::ResetComparer(comparer));
            }
        });
        hooks.push(ResetHook {
            comparer: comparer.clone(),
            connection,
        });
    }

    fn unhook_reset(&self, comparer: &SharedComparer<T>) {
        let mut hooks = self.reset_hooks.lock();
        if let Some(position) = hooks
            .iter()
            .position(|hook| same_comparer(&hook.comparer, comparer))
        {
            let hook = hooks.remove(position);
            hook.disconnect();
        }
    }
}

impl<T> ResetHook<T> {
    fn disconnect(&self) {
        if let Some(resettable) = self.comparer.as_resettable() {
            resettable.reset_signal().disconnect(self.connection);
        }
    }
}

impl<T: GroupItem> Drop for Shared<T> {
    fn drop(&mut self) {
        for hook in self.reset_hooks.get_mut().drain(..) {
            hook.disconnect();
        }
    }
}

/// A collection of items arranged into nested, sorted groups.
///
/// Mutating methods take `&self` and return nothing: inside a transaction
/// they are queued and only take effect when it ends. Read methods always
/// see the current, committed tree. Node accessors return `None` or an
/// empty result for ids that no longer resolve.
pub struct GroupList<T: GroupItem> {
    shared: Arc<Shared<T>>,
}

impl<T: GroupItem> Clone for GroupList<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: GroupItem> Default for GroupList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GroupItem> GroupList<T> {
    /// Creates an empty list with no criteria.
    pub fn new() -> Self {
        Self::with_config(GroupListConfig::default())
    }

    /// Creates an empty list with the given configuration.
    pub fn with_config(config: GroupListConfig) -> Self {
        let validate = config.validate_comparators;
        let shared = Arc::new_cyclic(|weak_self| Shared {
            config,
            weak_self: weak_self.clone(),
            tree: RwLock::new(Tree::new(validate)),
            transactions: Mutex::new(HashMap::new()),
            changed: Signal::new(),
            reset_hooks: Mutex::new(Vec::new()),
            group_by_source: Mutex::new(None),
            sort_by_source: Mutex::new(None),
        });
        Self { shared }
    }

    /// Starts a [`GroupListBuilder`].
    pub fn builder() -> GroupListBuilder<T> {
        GroupListBuilder::new()
    }

    /// The list's configuration.
    pub fn config(&self) -> &GroupListConfig {
        &self.shared.config
    }

    /// Emitted for every node whose properties changed.
    pub fn changed(&self) -> &Signal<NodeChange> {
        &self.shared.changed
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Inserts an item into its group, creating groups as needed.
    pub fn add(&self, item: T) {
        self.shared.submit(Action::Add(item));
    }

    /// Inserts every item as one transaction.
    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) {
        let _tx = self.transaction();
        for item in items {
            self.add(item);
        }
    }

    /// Removes the first item equal to `item`, pruning groups left empty.
    /// Absent items are ignored.
    pub fn remove(&self, item: &T) {
        self.shared.submit(Action::Remove(item.clone()));
    }

    /// Removes every item. Criteria are kept.
    pub fn clear(&self) {
        self.shared.submit(Action::Clear);
    }

    /// Rebuilds the tree by re-adding every item.
    pub fn reset(&self) {
        self.shared.submit(Action::Reset);
    }

    /// Moves one item whose grouping or sorting attributes changed.
    ///
    /// Nothing is published when the item already sits where it belongs.
    pub fn reset_item(&self, item: &T) {
        self.shared.submit(Action::ResetItem(item.clone()));
    }

    /// Appends a grouping level and splits every leaf by it.
    pub fn add_group_by(&self, comparer: SharedComparer<T>) {
        self.shared.submit(Action::AddGroupBy(comparer));
    }

    /// Removes a grouping level (matched by identity) and rebuilds the tree.
    pub fn remove_group_by(&self, comparer: &SharedComparer<T>) {
        self.shared.submit(Action::RemoveGroupBy(comparer.clone()));
    }

    /// Appends a sort criterion and resorts every leaf.
    pub fn add_sort_by(&self, comparer: SharedComparer<T>) {
        self.shared.submit(Action::AddSortBy(comparer));
    }

    /// Removes a sort criterion (matched by identity) and resorts every leaf.
    pub fn remove_sort_by(&self, comparer: &SharedComparer<T>) {
        self.shared.submit(Action::RemoveSortBy(comparer.clone()));
    }

    // =========================================================================
    // Criteria subscriptions
    // =========================================================================

    /// Adds every comparer in `source` as a grouping level and mirrors later
    /// insertions and removals. Replaces any previous group-by subscription.
    pub fn subscribe_group_by(&self, source: &ObservableList<SharedComparer<T>>) {
        let guard = self.mirror(source, GroupList::add_group_by, GroupList::remove_group_by);
        *self.shared.group_by_source.lock() = Some(guard);
    }

    /// Stops mirroring the group-by source. Returns whether one was set.
    pub fn unsubscribe_group_by(&self) -> bool {
        self.shared.group_by_source.lock().take().is_some()
    }

    /// Adds every comparer in `source` as a sort criterion and mirrors later
    /// insertions and removals. Replaces any previous sort-by subscription.
    pub fn subscribe_sort_by(&self, source: &ObservableList<SharedComparer<T>>) {
        let guard = self.mirror(source, GroupList::add_sort_by, GroupList::remove_sort_by);
        *self.shared.sort_by_source.lock() = Some(guard);
    }

    /// Stops mirroring the sort-by source. Returns whether one was set.
    pub fn unsubscribe_sort_by(&self) -> bool {
        self.shared.sort_by_source.lock().take().is_some()
    }

    fn mirror(
        &self,
        source: &ObservableList<SharedComparer<T>>,
        add: fn(&GroupList<T>, SharedComparer<T>),
        remove: fn(&GroupList<T>, &SharedComparer<T>),
    ) -> CriteriaSubscription<T> {
        for comparer in source.snapshot() {
            add(self, comparer);
        }

        let weak = Arc::downgrade(&self.shared);
        source.changed().connect_scoped(move |change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let list = GroupList { shared };
            match change {
                ListChange::Inserted { item, .. } => add(&list, item.clone()),
                ListChange::Removed { item, .. } => remove(&list, item),
                ListChange::Cleared { items } => {
                    for item in items {
                        remove(&list, item);
                    }
                }
            }
        })
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Opens (or nests) a transaction on the calling thread.
    pub fn begin_transaction(&self) -> TransactionHandle {
        let mut transactions = self.shared.transactions.lock();
        let transaction = transactions
            .entry(thread::current().id())
            .or_insert_with(Transaction::new);
        transaction.depth += 1;
        tracing::trace!(
            target: targets::TRANSACTION,
            list = %self.shared.config.name,
            depth = transaction.depth,
            "transaction opened"
        );
        TransactionHandle::new(transaction.depth)
    }

    /// Closes one nesting level. Closing the outermost level runs every
    /// queued action in order while holding the write lock, then publishes
    /// the coalesced notifications. Other threads see either none or all of
    /// the transaction's effects.
    pub fn end_transaction(&self, handle: TransactionHandle) -> Result<()> {
        handle.check_thread()?;
        let thread = thread::current().id();
        {
            let mut transactions = self.shared.transactions.lock();
            let Some(transaction) = transactions.get_mut(&thread) else {
                return Err(TransactionError::NoActiveTransaction);
            };
            transaction.depth = transaction.depth.saturating_sub(1);
            if transaction.depth > 0 || transaction.draining {
                return Ok(());
            }
            transaction.draining = true;
        }

        let _perf = PerfSpan::new(span_names::TRANSACTION_FLUSH);
        let mut applied = 0usize;
        loop {
            let batch = self
                .shared
                .transactions
                .lock()
                .get_mut(&thread)
                .map(|transaction| std::mem::take(&mut transaction.actions))
                .unwrap_or_default();
            if batch.is_empty() {
                break;
            }
            applied += batch.len();
            let changes = self.shared.execute_batch(batch);
            self.shared.route(changes);
        }

        let finished = self.shared.transactions.lock().remove(&thread);
        if let Some(transaction) = finished {
            tracing::debug!(
                target: targets::TRANSACTION,
                list = %self.shared.config.name,
                applied,
                notifications = transaction.notifications.len(),
                "transaction committed"
            );
            self.shared.publish(transaction.notifications);
        }
        Ok(())
    }

    /// Discards the calling thread's transaction: queued actions never run
    /// and nothing is published. Cancels every nesting level at once.
    pub fn cancel_transaction(&self, handle: TransactionHandle) -> Result<()> {
        handle.check_thread()?;
        let removed = self
            .shared
            .transactions
            .lock()
            .remove(&thread::current().id());
        match removed {
            Some(transaction) => {
                tracing::debug!(
                    target: targets::TRANSACTION,
                    list = %self.shared.config.name,
                    discarded = transaction.actions.len(),
                    "transaction cancelled"
                );
                Ok(())
            }
            None => Err(TransactionError::NoActiveTransaction),
        }
    }

    /// Opens a transaction that ends when the guard drops.
    pub fn transaction(&self) -> TransactionGuard<'_, T> {
        TransactionGuard::new(self)
    }

    /// Whether the calling thread has an open transaction.
    pub fn in_transaction(&self) -> bool {
        self.shared
            .transactions
            .lock()
            .contains_key(&thread::current().id())
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.shared.tree.read().root()
    }

    /// Total number of items.
    pub fn len(&self) -> usize {
        let tree = self.shared.tree.read();
        tree.count(tree.root())
    }

    /// Whether the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an equal item is present.
    pub fn contains(&self, item: &T) -> bool {
        self.shared.tree.read().find(item).is_some()
    }

    /// Every item in display order.
    pub fn items(&self) -> Vec<T> {
        let tree = self.shared.tree.read();
        tree.collect_items(tree.root())
    }

    /// The flattened structure of the whole tree.
    pub fn structure(&self) -> Vec<StructureEntry<T>> {
        let tree = self.shared.tree.read();
        tree.structure(tree.root())
    }

    /// The flattened structure below `node`.
    pub fn node_structure(&self, node: NodeId) -> Vec<StructureEntry<T>> {
        self.shared.tree.read().structure(node)
    }

    /// The grouping levels, outermost first.
    pub fn group_bys(&self) -> Vec<SharedComparer<T>> {
        self.shared.tree.read().group_bys().to_vec()
    }

    /// The sort criteria, highest priority first.
    pub fn sort_bys(&self) -> Vec<SharedComparer<T>> {
        self.shared.tree.read().sort_bys().to_vec()
    }

    /// Child groups of `node`, in group order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.shared.tree.read().children(node).to_vec()
    }

    /// Parent of `node`; `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.shared.tree.read().parent(node)
    }

    /// Distance of `node` from the root.
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        self.shared.tree.read().depth(node)
    }

    /// Whether `node` has no child groups.
    pub fn is_leaf(&self, node: NodeId) -> Option<bool> {
        self.shared.tree.read().is_leaf(node)
    }

    /// Items held directly by `node`; empty unless it is a leaf.
    pub fn node_items(&self, node: NodeId) -> Vec<T> {
        self.shared.tree.read().node_items(node).to_vec()
    }

    /// Display label of the group at `node`.
    pub fn key(&self, node: NodeId) -> Option<String> {
        self.shared.tree.read().key(node)
    }

    /// Items in the subtree of `node`.
    pub fn count(&self, node: NodeId) -> usize {
        self.shared.tree.read().count(node)
    }

    /// First item of the subtree of `node`.
    pub fn first_item(&self, node: NodeId) -> Option<T> {
        self.shared.tree.read().first_item(node).cloned()
    }

    /// Height of the subtree of `node`.
    pub fn depth_down(&self, node: NodeId) -> Option<usize> {
        let tree = self.shared.tree.read();
        tree.contains_node(node).then(|| tree.depth_down(node))
    }

    /// Summary of the group at `node`.
    pub fn header(&self, node: NodeId) -> Option<GroupHeader> {
        let tree = self.shared.tree.read();
        tree.contains_node(node).then(|| tree.header(node))
    }

    /// The leaf holding an item equal to `item`.
    pub fn find_leaf(&self, item: &T) -> Option<NodeId> {
        self.shared.tree.read().find(item).map(|(leaf, _)| leaf)
    }
}

impl<T: GroupItem> fmt::Debug for GroupList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.shared.tree.read();
        f.debug_struct("GroupList")
            .field("name", &self.shared.config.name)
            .field("len", &tree.count(tree.root()))
            .field("group_bys", &tree.group_bys().len())
            .field("sort_bys", &tree.sort_bys().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(GroupList<String>: Send, Sync, Clone);
static_assertions::assert_impl_all!(TransactionHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparer, KeyComparer, Resettable, ReversibleComparer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn initial() -> SharedComparer<String> {
        KeyComparer::shared(|s: &String| s.chars().next().unwrap_or(' '))
    }

    fn alphabetical() -> SharedComparer<String> {
        FnComparer::shared(|a: &String, b: &String| a.cmp(b))
    }

    fn counter(list: &GroupList<String>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        list.changed().connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_builder_applies_criteria() {
        let list = GroupList::builder()
            .name("fruit")
            .group_by(initial())
            .sort_by(alphabetical())
            .build();
        list.extend(["Cherry", "Apple"].map(String::from));

        assert_eq!(list.config().name, "fruit");
        assert_eq!(list.group_bys().len(), 1);
        assert_eq!(list.items(), ["Apple", "Cherry"]);
    }

    #[test]
    fn test_transaction_defers_and_coalesces() {
        let list = GroupList::builder().sort_by(alphabetical()).build();
        let count = counter(&list);

        let handle = list.begin_transaction();
        list.add("b".to_string());
        list.add("a".to_string());
        assert!(list.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        list.end_transaction(handle).unwrap();

        assert_eq!(list.items(), ["a", "b"]);
        // Both adds hit the root leaf: one coalesced change.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_without_transaction_fails() {
        let list = GroupList::<String>::new();
        let handle = list.begin_transaction();
        let stale = TransactionHandle::new(1);
        list.cancel_transaction(handle).unwrap();
        assert_eq!(
            list.end_transaction(stale),
            Err(TransactionError::NoActiveTransaction)
        );
    }

    #[test]
    fn test_handle_from_other_thread_rejected() {
        let list = GroupList::<String>::new();
        let handle = std::thread::spawn(|| TransactionHandle::new(1)).join().unwrap();
        let own = list.begin_transaction();

        assert!(matches!(
            list.end_transaction(handle),
            Err(TransactionError::ThreadMismatch { .. })
        ));
        assert!(list.in_transaction());
        list.end_transaction(own).unwrap();
        assert!(!list.in_transaction());
    }

    #[test]
    fn test_resettable_comparer_regroups() {
        let reversible = Arc::new(ReversibleComparer::new(initial()));
        let comparer: SharedComparer<String> = reversible.clone();
        let list = GroupList::builder().group_by(comparer).build();
        list.extend(["Apple", "Banana"].map(String::from));

        let keys = |list: &GroupList<String>| {
            list.children(list.root())
                .into_iter()
                .filter_map(|node| list.key(node))
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&list), ["A", "B"]);

        reversible.set_descending(true);
        assert_eq!(keys(&list), ["B", "A"]);
    }

    #[test]
    fn test_dropping_list_disconnects_reset_hooks() {
        let reversible = Arc::new(ReversibleComparer::new(alphabetical()));
        {
            let list = GroupList::<String>::new();
            list.add_sort_by(reversible.clone());
            assert_eq!(reversible.reset_signal().connection_count(), 1);
        }
        assert_eq!(reversible.reset_signal().connection_count(), 0);
    }

    #[test]
    fn test_removing_comparer_unhooks() {
        let reversible = Arc::new(ReversibleComparer::new(alphabetical()));
        let comparer: SharedComparer<String> = reversible.clone();
        let list = GroupList::new();
        list.add_sort_by(comparer.clone());
        list.add_group_by(comparer.clone());
        assert_eq!(reversible.reset_signal().connection_count(), 1);

        list.remove_sort_by(&comparer);
        assert_eq!(reversible.reset_signal().connection_count(), 1);
        list.remove_group_by(&comparer);
        assert_eq!(reversible.reset_signal().connection_count(), 0);
    }
}
