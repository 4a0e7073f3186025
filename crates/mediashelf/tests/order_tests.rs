//! Integration tests for play orders.

use std::collections::HashMap;

use mediashelf::{MediaOrder, OrderSet, OrderSnapshot, OrderType};

#[test]
fn test_sequential_scenario() {
    let mut order = MediaOrder::new(OrderType::Sequential);
    for index in 1..=4 {
        order.add_index(index);
    }
    assert_eq!(order.indices(), &[1, 2, 3, 4]);

    order.remove_index(2);
    assert_eq!(order.indices(), &[1, 3, 4]);
    assert_eq!(order.position_for_index(3), Some(1));
    assert_eq!(order.index_for_position(0), Some(1));

    order.remove_index(42);
    assert_eq!(order.len(), 3);
}

#[test]
fn test_shuffle_is_uniform() {
    let mut order = MediaOrder::with_seed(OrderType::Shuffle, 0x5eed);
    for index in 0..3 {
        order.add_index(index);
    }

    const TRIALS: usize = 6000;
    let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();
    for _ in 0..TRIALS {
        order.shuffle();
        *counts.entry(order.indices().to_vec()).or_default() += 1;
    }

    // Expected 1000 each; the bound is over five standard deviations.
    assert_eq!(counts.len(), 6);
    for (permutation, count) in &counts {
        assert!(
            (850..=1150).contains(count),
            "{permutation:?} drawn {count} times"
        );
    }
}

#[test]
fn test_shuffle_only_applies_to_shuffle_orders() {
    for order_type in [OrderType::Sequential, OrderType::Custom] {
        let mut order = MediaOrder::with_seed(order_type, 3);
        for index in 0..10 {
            order.add_index(index);
        }
        order.shuffle();
        assert_eq!(order.indices(), (0..10).collect::<Vec<_>>().as_slice());
    }
}

#[test]
fn test_switching_to_shuffle_keeps_permutation() {
    let mut order = MediaOrder::with_seed(OrderType::Sequential, 9);
    for index in 0..5 {
        order.add_index(index);
    }
    order.set_order_type(OrderType::Shuffle);
    assert_eq!(order.indices(), &[0, 1, 2, 3, 4]);

    order.add_index(5);
    assert_eq!(order.len(), 6);
    assert!(order.index_exists(5));
}

#[test]
fn test_snapshot_restores_custom_arrangement() {
    let mut order = MediaOrder::new(OrderType::Custom);
    for index in [4, 8, 15, 16] {
        order.add_index(index);
    }
    order.move_position(3, 0);

    let json = serde_json::to_string(&order.snapshot()).unwrap();
    let snapshot: OrderSnapshot = serde_json::from_str(&json).unwrap();
    let restored = MediaOrder::from_snapshot(snapshot);

    assert_eq!(restored.order_type(), OrderType::Custom);
    assert_eq!(restored.indices(), &[16, 4, 8, 15]);
}

#[test]
fn test_order_set_tracks_active_order() {
    use std::sync::Arc;
    use parking_lot::Mutex;

    let mut set = OrderSet::new();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();
    set.active_changed()
        .connect(move |active| changes_clone.lock().push(*active));

    let sequential = set.insert(MediaOrder::new(OrderType::Sequential));
    let shuffled = set.insert(MediaOrder::with_seed(OrderType::Shuffle, 11));
    for index in 0..8 {
        set.add_index(index);
    }

    set.load(sequential).unwrap();
    set.load(shuffled).unwrap();
    assert_eq!(set.unload(), Some(shuffled));
    assert_eq!(set.unload(), None);

    assert_eq!(
        *changes.lock(),
        vec![Some(sequential), Some(shuffled), None]
    );
    assert!(set.iter().all(|(_, order)| !order.is_loaded() && order.len() == 8));
}
