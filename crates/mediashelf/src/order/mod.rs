//! Play orders over a track list.
//!
//! A [`MediaOrder`] is a permutation of track indices: position `p` plays
//! track `indices()[p]`. An [`OrderSet`] holds several orders for the same
//! track list and keeps exactly one of them, or none, loaded.

mod media_order;
mod order_set;

pub use media_order::{MediaOrder, OrderSnapshot, OrderType};
pub use order_set::{OrderId, OrderSet};
