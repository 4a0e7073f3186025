//! A play order: a permutation of track indices.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use mediashelf_core::logging::targets;
use mediashelf_core::Signal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How a [`MediaOrder`] places new indices and whether it shuffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// New indices are appended.
    #[default]
    Sequential,
    /// New indices land at a random position; [`MediaOrder::shuffle`] is active.
    Shuffle,
    /// A hand-arranged order. New indices are appended.
    Custom,
}

/// Serializable state of a [`MediaOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// The order's type.
    pub order_type: OrderType,
    /// Track indices by play position.
    pub indices: Vec<usize>,
}

/// A permutation mapping play positions to track indices.
///
/// Each index appears at most once. Positions are `0..len()`. Out-of-range
/// positions passed to mutating methods are ignored.
///
/// An order is either loaded (the active order of its collection) or not.
/// Only the owning [`OrderSet`](super::OrderSet) toggles this, which keeps
/// at most one of its orders loaded.
///
/// ```
/// use mediashelf::order::{MediaOrder, OrderType};
///
/// let mut order = MediaOrder::new(OrderType::Sequential);
/// order.add_index(4);
/// order.add_index(7);
/// order.swap_positions(0, 1);
/// assert_eq!(order.indices(), &[7, 4]);
/// assert_eq!(order.position_for_index(4), Some(1));
/// ```
pub struct MediaOrder {
    order_type: OrderType,
    indices: Vec<usize>,
    loaded: AtomicBool,
    loaded_changed: Signal<bool>,
    rng: StdRng,
}

impl MediaOrder {
    /// Creates an empty, unloaded order seeded from system entropy.
    pub fn new(order_type: OrderType) -> Self {
        Self::with_rng(order_type, StdRng::from_entropy())
    }

    /// Creates an empty, unloaded order with deterministic shuffling.
    pub fn with_seed(order_type: OrderType, seed: u64) -> Self {
        Self::with_rng(order_type, StdRng::seed_from_u64(seed))
    }

    fn with_rng(order_type: OrderType, rng: StdRng) -> Self {
        Self {
            order_type,
            indices: Vec::new(),
            loaded: AtomicBool::new(false),
            loaded_changed: Signal::new(),
            rng,
        }
    }

    /// Restores an order from a snapshot. Duplicate indices after the first
    /// occurrence are dropped.
    pub fn from_snapshot(snapshot: OrderSnapshot) -> Self {
        let mut order = Self::new(snapshot.order_type);
        for index in snapshot.indices {
            if !order.index_exists(index) {
                order.indices.push(index);
            }
        }
        order
    }

    /// The order's serializable state.
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            order_type: self.order_type,
            indices: self.indices.clone(),
        }
    }

    /// How new indices are placed.
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Changes the type. The current permutation is kept as is.
    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    /// Track indices by play position.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of indices in the order.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the order holds no indices.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Adds a track index. Shuffle orders insert at a uniformly random
    /// position in `0..=len`; others append. Present indices are ignored.
    pub fn add_index(&mut self, index: usize) {
        if self.index_exists(index) {
            return;
        }
        if self.order_type == OrderType::Shuffle {
            let position = self.rng.gen_range(0..=self.indices.len());
            self.indices.insert(position, index);
        } else {
            self.indices.push(index);
        }
    }

    /// Removes a track index if present.
    pub fn remove_index(&mut self, index: usize) {
        if let Some(position) = self.position_for_index(index) {
            self.indices.remove(position);
        }
    }

    /// Whether `index` appears in the order.
    pub fn index_exists(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Whether `position` is in `0..len()`.
    pub fn position_exists(&self, position: usize) -> bool {
        position < self.indices.len()
    }

    /// Play position of a track index.
    pub fn position_for_index(&self, index: usize) -> Option<usize> {
        self.indices.iter().position(|&existing| existing == index)
    }

    /// Track index at a play position.
    pub fn index_for_position(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    /// Moves the index at `position` so it ends up at `new_position`
    /// (clamped to the end). Ignored if `position` is out of range.
    pub fn move_position(&mut self, position: usize, new_position: usize) {
        if !self.position_exists(position) {
            return;
        }
        let index = self.indices.remove(position);
        let new_position = new_position.min(self.indices.len());
        self.indices.insert(new_position, index);
    }

    /// Exchanges two positions. Ignored unless both are in range.
    pub fn swap_positions(&mut self, a: usize, b: usize) {
        if self.position_exists(a) && self.position_exists(b) {
            self.indices.swap(a, b);
        }
    }

    /// Reorders the permutation uniformly at random. Only shuffle orders
    /// are affected.
    pub fn shuffle(&mut self) {
        if self.order_type != OrderType::Shuffle {
            return;
        }
        // Fisher-Yates, last position first.
        for i in (1..self.indices.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            self.indices.swap(i, j);
        }
        tracing::trace!(target: targets::ORDER, len = self.indices.len(), "order shuffled");
    }

    /// Removes every index.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Whether this is the active order of its collection.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Marks the order loaded or unloaded. Emits
    /// [`loaded_changed`](Self::loaded_changed) when the state flips.
    pub(crate) fn set_loaded(&self, loaded: bool) {
        if self.loaded.swap(loaded, Ordering::AcqRel) != loaded {
            tracing::debug!(target: targets::ORDER, loaded, "order load state changed");
            self.loaded_changed.emit(loaded);
        }
    }

    /// Emitted with the new state whenever the order is loaded or unloaded.
    pub fn loaded_changed(&self) -> &Signal<bool> {
        &self.loaded_changed
    }
}

impl Default for MediaOrder {
    fn default() -> Self {
        Self::new(OrderType::default())
    }
}

impl fmt::Debug for MediaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaOrder")
            .field("order_type", &self.order_type)
            .field("indices", &self.indices)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

static_assertions::assert_impl_all!(MediaOrder: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(indices: &[usize]) -> MediaOrder {
        let mut order = MediaOrder::new(OrderType::Sequential);
        for &index in indices {
            order.add_index(index);
        }
        order
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let order = sequential(&[3, 1, 3, 2]);
        assert_eq!(order.indices(), &[3, 1, 2]);
    }

    #[test]
    fn test_lookups() {
        let order = sequential(&[5, 9]);
        assert_eq!(order.position_for_index(9), Some(1));
        assert_eq!(order.position_for_index(4), None);
        assert_eq!(order.index_for_position(0), Some(5));
        assert_eq!(order.index_for_position(2), None);
        assert!(order.position_exists(1));
        assert!(!order.position_exists(2));
    }

    #[test]
    fn test_move_position() {
        let mut order = sequential(&[0, 1, 2, 3]);
        order.move_position(0, 2);
        assert_eq!(order.indices(), &[1, 2, 0, 3]);
        order.move_position(1, 99);
        assert_eq!(order.indices(), &[1, 0, 3, 2]);
        order.move_position(10, 0);
        assert_eq!(order.indices(), &[1, 0, 3, 2]);
    }

    #[test]
    fn test_swap_requires_both_positions() {
        let mut order = sequential(&[0, 1, 2]);
        order.swap_positions(0, 5);
        assert_eq!(order.indices(), &[0, 1, 2]);
        order.swap_positions(0, 2);
        assert_eq!(order.indices(), &[2, 1, 0]);
    }

    #[test]
    fn test_sequential_shuffle_is_noop() {
        let mut order = sequential(&[0, 1, 2, 3, 4]);
        order.shuffle();
        assert_eq!(order.indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_seeded_shuffle_is_permutation() {
        let mut order = MediaOrder::with_seed(OrderType::Shuffle, 7);
        for index in 0..20 {
            order.add_index(index);
        }
        order.shuffle();

        let mut sorted = order.indices().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_loaded_signal_fires_on_change() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicUsize;

        let order = MediaOrder::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        order.loaded_changed().connect(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        order.set_loaded(true);
        order.set_loaded(true);
        order.set_loaded(false);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(!order.is_loaded());
    }

    #[test]
    fn test_snapshot_serde() {
        let order = sequential(&[2, 0, 1]);
        let json = serde_json::to_string(&order.snapshot()).unwrap();
        assert_eq!(json, r#"{"order_type":"sequential","indices":[2,0,1]}"#);

        let restored = MediaOrder::from_snapshot(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.indices(), &[2, 0, 1]);
        assert!(!restored.is_loaded());
    }
}
