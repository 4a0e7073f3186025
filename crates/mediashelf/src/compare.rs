//! Comparators used for grouping and sorting.
//!
//! A [`Comparer`] ranks two items. The same trait serves both purposes in a
//! [`GroupList`](crate::GroupList):
//!
//! - as a *group-by*, `Ordering::Equal` means "same group" and any other
//!   result orders the groups;
//! - as a *sort-by*, it orders items within a leaf.
//!
//! Comparers are shared as [`SharedComparer`] and identified by pointer
//! identity, so the same instance can be added to and later removed from a
//! list.
//!
//! Two optional capabilities are queried rather than required:
//!
//! - [`Comparer::group_key`] labels a group for display;
//! - [`Comparer::as_resettable`] exposes a [`Resettable`] whose signal fires
//!   when the comparer's own configuration changes, asking every list that
//!   uses it to recompute the decisions it made.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use mediashelf_core::Signal;

/// A comparer shared between lists and criteria collections.
pub type SharedComparer<T> = Arc<dyn Comparer<T>>;

/// Type alias for a closure-based compare function.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Ranks two items under a strict weak ordering.
///
/// Implementations must be consistent: transitive, with `compare(a, b)` the
/// reverse of `compare(b, a)`. An inconsistent comparer leaves the tree shape
/// unspecified but never panics.
pub trait Comparer<T>: Send + Sync {
    /// Compares two items.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// A display label for the group `item` belongs to, if this comparer
    /// can produce one.
    fn group_key(&self, _item: &T) -> Option<String> {
        None
    }

    /// The reset capability, for comparers whose criteria can change.
    fn as_resettable(&self) -> Option<&dyn Resettable> {
        None
    }
}

/// Capability of a comparer whose own configuration can change.
pub trait Resettable: Send + Sync {
    /// Emitted after the comparer's criteria changed.
    fn reset_signal(&self) -> &Signal<()>;
}

/// Whether two shared comparers are the same instance.
pub fn same_comparer<T>(a: &SharedComparer<T>, b: &SharedComparer<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Chains comparers in priority order.
///
/// The first non-equal result wins; an empty chain compares everything equal.
pub struct CompositeComparer<T> {
    parts: Vec<SharedComparer<T>>,
}

impl<T> CompositeComparer<T> {
    /// Creates a composite over `parts`.
    pub fn new(parts: Vec<SharedComparer<T>>) -> Self {
        Self { parts }
    }

    /// The chained comparers.
    pub fn parts(&self) -> &[SharedComparer<T>] {
        &self.parts
    }
}

impl<T> Comparer<T> for CompositeComparer<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.parts
            .iter()
            .map(|part| part.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl<T> fmt::Debug for CompositeComparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeComparer")
            .field("parts", &self.parts.len())
            .finish()
    }
}

/// A comparer backed by a closure.
pub struct FnComparer<T> {
    compare: CompareFn<T>,
}

impl<T> FnComparer<T> {
    /// Wraps `compare`.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Wraps `compare` as a [`SharedComparer`].
    pub fn shared<F>(compare: F) -> SharedComparer<T>
    where
        T: 'static,
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Arc::new(Self::new(compare))
    }
}

impl<T> Comparer<T> for FnComparer<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

/// Compares items by an extracted key.
///
/// The key's `Display` form doubles as the group label, so a `KeyComparer`
/// used as a group-by names its groups.
///
/// ```
/// use mediashelf::compare::{Comparer, KeyComparer};
///
/// let by_initial = KeyComparer::new(|s: &String| s.chars().next().unwrap_or(' '));
/// assert!(by_initial.compare(&"Apple".into(), &"Avocado".into()).is_eq());
/// assert_eq!(by_initial.group_key(&"Banana".into()).as_deref(), Some("B"));
/// ```
pub struct KeyComparer<T, K> {
    key: Arc<dyn Fn(&T) -> K + Send + Sync>,
}

impl<T, K> KeyComparer<T, K>
where
    K: Ord + fmt::Display,
{
    /// Compares by the key `key` extracts.
    pub fn new<F>(key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self { key: Arc::new(key) }
    }

    /// Builds a [`SharedComparer`] comparing by `key`.
    pub fn shared<F>(key: F) -> SharedComparer<T>
    where
        T: 'static,
        K: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Arc::new(Self::new(key))
    }
}

impl<T, K> Comparer<T> for KeyComparer<T, K>
where
    K: Ord + fmt::Display,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }

    fn group_key(&self, item: &T) -> Option<String> {
        Some((self.key)(item).to_string())
    }
}

/// Wraps a comparer and lets its direction be flipped at runtime.
///
/// Flipping fires the reset signal, so lists holding this comparer regroup
/// or resort the parts of the tree it decided.
pub struct ReversibleComparer<T> {
    inner: SharedComparer<T>,
    descending: AtomicBool,
    reset: Signal<()>,
}

impl<T: 'static> ReversibleComparer<T> {
    /// Wraps `inner` in ascending direction.
    pub fn new(inner: SharedComparer<T>) -> Self {
        Self {
            inner,
            descending: AtomicBool::new(false),
            reset: Signal::new(),
        }
    }

    /// Whether the wrapped order is reversed.
    pub fn is_descending(&self) -> bool {
        self.descending.load(AtomicOrdering::Acquire)
    }

    /// Sets the direction, firing the reset signal if it changed.
    pub fn set_descending(&self, descending: bool) {
        if self.descending.swap(descending, AtomicOrdering::AcqRel) != descending {
            self.reset.emit(());
        }
    }
}

impl<T: 'static> Comparer<T> for ReversibleComparer<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        let ordering = self.inner.compare(a, b);
        if self.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }

    fn group_key(&self, item: &T) -> Option<String> {
        self.inner.group_key(item)
    }

    fn as_resettable(&self) -> Option<&dyn Resettable> {
        Some(self)
    }
}

impl<T: 'static> Resettable for ReversibleComparer<T> {
    fn reset_signal(&self) -> &Signal<()> {
        &self.reset
    }
}
