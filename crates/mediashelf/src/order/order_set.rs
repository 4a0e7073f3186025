//! A collection of play orders with at most one loaded.

use mediashelf_core::logging::targets;
use mediashelf_core::Signal;
use slotmap::{new_key_type, SlotMap};

use super::MediaOrder;
use crate::error::{OrderError, OrderResult};

new_key_type! {
    /// Identifies an order within an [`OrderSet`].
    pub struct OrderId;
}

/// Owns several [`MediaOrder`]s and keeps at most one of them loaded.
///
/// Track index changes are applied to every order so they stay permutations
/// of the same track list.
pub struct OrderSet {
    orders: SlotMap<OrderId, MediaOrder>,
    active: Option<OrderId>,
    active_changed: Signal<Option<OrderId>>,
}

impl Default for OrderSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSet {
    /// An empty set with nothing loaded.
    pub fn new() -> Self {
        Self {
            orders: SlotMap::with_key(),
            active: None,
            active_changed: Signal::new(),
        }
    }

    /// Adds an order. It stays unloaded until passed to [`load`](Self::load).
    pub fn insert(&mut self, order: MediaOrder) -> OrderId {
        self.orders.insert(order)
    }

    /// Removes an order, unloading it first if it is active.
    pub fn remove(&mut self, id: OrderId) -> OrderResult<MediaOrder> {
        if self.active() == Some(id) {
            self.unload();
        }
        self.orders.remove(id).ok_or(OrderError::UnknownOrder(id))
    }

    /// The order named by `id`.
    pub fn get(&self, id: OrderId) -> Option<&MediaOrder> {
        self.orders.get(id)
    }

    /// The order named by `id`, for rearranging.
    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut MediaOrder> {
        self.orders.get_mut(id)
    }

    /// Whether `id` names an order in the set.
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(id)
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the set holds no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Every order with its id, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, &MediaOrder)> {
        self.orders.iter()
    }

    /// Loads `id`, unloading whichever order was loaded before.
    ///
    /// Returns whether the active order changed.
    pub fn load(&mut self, id: OrderId) -> OrderResult<bool> {
        if !self.orders.contains_key(id) {
            return Err(OrderError::UnknownOrder(id));
        }
        Ok(self.activate(id))
    }

    fn activate(&mut self, id: OrderId) -> bool {
        let previous = self.active();
        if previous == Some(id) {
            return false;
        }
        if let Some(order) = previous.and_then(|previous| self.orders.get(previous)) {
            order.set_loaded(false);
        }
        if let Some(order) = self.orders.get(id) {
            order.set_loaded(true);
        }
        self.set_active(Some(id));
        true
    }

    /// Unloads the active order, returning its id.
    pub fn unload(&mut self) -> Option<OrderId> {
        let previous = self.active()?;
        if let Some(order) = self.orders.get(previous) {
            order.set_loaded(false);
        }
        self.set_active(None);
        Some(previous)
    }

    fn set_active(&mut self, active: Option<OrderId>) {
        if self.active != active {
            self.active = active;
            tracing::debug!(target: targets::ORDER, ?active, "active order changed");
            self.active_changed.emit(active);
        }
    }

    /// The loaded order's id.
    pub fn active(&self) -> Option<OrderId> {
        self.active
    }

    /// The loaded order.
    pub fn active_order(&self) -> Option<&MediaOrder> {
        self.active().and_then(|id| self.orders.get(id))
    }

    /// Emitted with the new active id whenever it changes.
    pub fn active_changed(&self) -> &Signal<Option<OrderId>> {
        &self.active_changed
    }

    /// Adds a track index to every order.
    pub fn add_index(&mut self, index: usize) {
        for order in self.orders.values_mut() {
            order.add_index(index);
        }
    }

    /// Removes a track index from every order.
    pub fn remove_index(&mut self, index: usize) {
        for order in self.orders.values_mut() {
            order.remove_index(index);
        }
    }
}

impl std::fmt::Debug for OrderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSet")
            .field("len", &self.orders.len())
            .field("active", &self.active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderType;

    #[test]
    fn test_load_keeps_one_active() {
        let mut set = OrderSet::new();
        let first = set.insert(MediaOrder::new(OrderType::Sequential));
        let second = set.insert(MediaOrder::new(OrderType::Custom));

        assert_eq!(set.load(first), Ok(true));
        assert_eq!(set.load(first), Ok(false));
        assert_eq!(set.load(second), Ok(true));

        assert!(!set.get(first).unwrap().is_loaded());
        assert!(set.get(second).unwrap().is_loaded());
        assert_eq!(set.active(), Some(second));
    }

    #[test]
    fn test_switching_orders_leaves_one_loaded() {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let mut set = OrderSet::new();
        let a = set.insert(MediaOrder::default());
        let b = set.insert(MediaOrder::default());
        assert_eq!(set.active(), None);

        let transitions = Arc::new(Mutex::new(Vec::new()));
        for id in [a, b] {
            let sink = transitions.clone();
            set.get(id)
                .unwrap()
                .loaded_changed()
                .connect(move |&loaded| sink.lock().push((id, loaded)));
        }

        set.load(a).unwrap();
        set.load(b).unwrap();

        let loaded: Vec<OrderId> = set
            .iter()
            .filter(|(_, order)| order.is_loaded())
            .map(|(id, _)| id)
            .collect();
        assert_eq!(loaded, [b]);
        assert_eq!(set.active(), Some(b));
        assert_eq!(*transitions.lock(), [(a, true), (a, false), (b, true)]);
    }

    #[test]
    fn test_remove_active_unloads() {
        let mut set = OrderSet::new();
        let id = set.insert(MediaOrder::default());
        set.load(id).unwrap();

        let removed = set.remove(id).unwrap();
        assert!(!removed.is_loaded());
        assert_eq!(set.active(), None);
        assert_eq!(set.remove(id).unwrap_err(), OrderError::UnknownOrder(id));
        assert_eq!(set.load(id), Err(OrderError::UnknownOrder(id)));
    }

    #[test]
    fn test_index_changes_reach_every_order() {
        let mut set = OrderSet::new();
        let a = set.insert(MediaOrder::new(OrderType::Sequential));
        let b = set.insert(MediaOrder::with_seed(OrderType::Shuffle, 1));

        for index in 0..5 {
            set.add_index(index);
        }
        set.remove_index(2);

        for id in [a, b] {
            let order = set.get(id).unwrap();
            assert_eq!(order.len(), 4);
            assert!(!order.index_exists(2));
        }
    }
}
