//! Observable ordered collections.
//!
//! [`ObservableList`] is a `Vec` behind a lock that announces every insertion
//! and removal on a [`Signal`]. Consumers mirror its contents by replaying
//! the [`ListChange`] stream after reading an initial [`snapshot`].
//!
//! [`snapshot`]: ObservableList::snapshot

use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::Signal;

/// A single change to an [`ObservableList`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<T> {
    /// `item` now sits at `index`.
    Inserted {
        /// Position of the new item.
        index: usize,
        /// The inserted item.
        item: T,
    },
    /// `item` was removed from `index`.
    Removed {
        /// Position the item occupied.
        index: usize,
        /// The removed item.
        item: T,
    },
    /// Every item was removed.
    Cleared {
        /// The items the list held, in order.
        items: Vec<T>,
    },
}

/// An ordered collection that reports insertions and removals.
///
/// Signals are emitted after the internal lock is released, so slots may
/// read the list.
pub struct ObservableList<T> {
    items: RwLock<Vec<T>>,
    changed: Arc<Signal<ListChange<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a list with initial contents. No signal is emitted.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            changed: Arc::new(Signal::new()),
        }
    }

    /// The signal emitted after every change.
    pub fn changed(&self) -> &Arc<Signal<ListChange<T>>> {
        &self.changed
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A clone of the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// The item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.emit(ListChange::Inserted { index, item });
    }

    /// Inserts an item at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, item: T) {
        let index = {
            let mut items = self.items.write();
            let index = index.min(items.len());
            items.insert(index, item.clone());
            index
        };
        self.emit(ListChange::Inserted { index, item });
    }

    /// Removes and returns the item at `index`.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let item = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.emit(ListChange::Removed {
            index,
            item: item.clone(),
        });
        Some(item)
    }

    /// Removes the first item matching `predicate`.
    pub fn remove_first<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.items.read().iter().position(predicate)?;
        self.remove_at(index)
    }

    /// Removes every item.
    pub fn clear(&self) {
        let items = std::mem::take(&mut *self.items.write());
        if !items.is_empty() {
            self.emit(ListChange::Cleared { items });
        }
    }

    fn emit(&self, change: ListChange<T>) {
        tracing::trace!(target: targets::COLLECTION, len = self.len(), "list changed");
        self.changed.emit(change);
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(list: &ObservableList<&'static str>) -> Arc<Mutex<Vec<ListChange<&'static str>>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        list.changed().connect(move |change| seen_clone.lock().push(change.clone()));
        seen
    }

    #[test]
    fn test_push_and_insert_report_positions() {
        let list = ObservableList::new();
        let seen = recorder(&list);

        list.push("album");
        list.insert(0, "artist");
        list.insert(10, "year");

        assert_eq!(list.snapshot(), vec!["artist", "album", "year"]);
        assert_eq!(
            *seen.lock(),
            vec![
                ListChange::Inserted { index: 0, item: "album" },
                ListChange::Inserted { index: 0, item: "artist" },
                ListChange::Inserted { index: 2, item: "year" },
            ]
        );
    }

    #[test]
    fn test_remove_reports_item() {
        let list = ObservableList::from_vec(vec!["artist", "album"]);
        let seen = recorder(&list);

        assert_eq!(list.remove_first(|s| *s == "album"), Some("album"));
        assert_eq!(list.remove_at(5), None);
        assert_eq!(
            *seen.lock(),
            vec![ListChange::Removed { index: 1, item: "album" }]
        );
    }

    #[test]
    fn test_clear_is_silent_when_empty() {
        let list = ObservableList::from_vec(vec!["genre"]);
        let seen = recorder(&list);

        list.clear();
        list.clear();

        assert!(list.is_empty());
        assert_eq!(
            *seen.lock(),
            vec![ListChange::Cleared { items: vec!["genre"] }]
        );
    }

    #[test]
    fn test_slot_can_read_list() {
        let list = Arc::new(ObservableList::new());
        let lens = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&list);
        let lens_clone = lens.clone();
        list.changed().connect(move |_| {
            if let Some(list) = weak.upgrade() {
                lens_clone.lock().push(list.len());
            }
        });

        list.push(1);
        list.push(2);
        assert_eq!(*lens.lock(), vec![1, 2]);
    }
}
