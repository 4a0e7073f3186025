//! Grouping and play-order models for media libraries.
//!
//! mediashelf provides the data layer a library browser sits on:
//!
//! - **Comparers** ([`compare`]): grouping and sorting criteria, optionally
//!   able to label groups and to announce that their own criteria changed
//! - **Group lists** ([`group_list`]): a flat item collection arranged into a
//!   tree of nested, sorted groups, with per-thread transactions and
//!   coalesced change notifications
//! - **Play orders** ([`order`]): permutations of track indices with
//!   sequential, shuffled, and hand-arranged modes
//!
//! The signal and observable collection plumbing comes from
//! [`mediashelf_core`].
//!
//! # Quick Start
//!
//! ```
//! use mediashelf::{GroupList, NodeProperty};
//! use mediashelf::compare::{FnComparer, KeyComparer};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Track {
//!     artist: &'static str,
//!     title: &'static str,
//! }
//!
//! let list = GroupList::builder()
//!     .group_by(KeyComparer::shared(|t: &Track| t.artist))
//!     .sort_by(FnComparer::shared(|a: &Track, b: &Track| a.title.cmp(b.title)))
//!     .build();
//!
//! let root = list.root();
//! list.changed().connect(move |change| {
//!     if change.node == root && change.properties.contains(NodeProperty::Structure) {
//!         println!("library changed");
//!     }
//! });
//!
//! list.extend([
//!     Track { artist: "Low", title: "Words" },
//!     Track { artist: "Can", title: "Vitamin C" },
//!     Track { artist: "Low", title: "Lullaby" },
//! ]);
//!
//! let artists = list.children(root);
//! assert_eq!(list.key(artists[0]).as_deref(), Some("Can"));
//! assert_eq!(list.count(artists[1]), 2);
//! ```
//!
//! # Logging
//!
//! Everything is instrumented with `tracing` under the targets in
//! [`mediashelf_core::logging::targets`]. The library never installs a
//! subscriber.

pub mod compare;
mod error;
pub mod group_list;
pub mod order;

pub use compare::{Comparer, CompositeComparer, Resettable, SharedComparer};
pub use error::{OrderError, OrderResult};
pub use group_list::{
    GroupHeader, GroupItem, GroupList, GroupListBuilder, GroupListConfig, GroupTreeDebug,
    NodeChange, NodeId, NodeProperty, PropertySet, StructureEntry, TransactionGuard,
    TransactionHandle,
};
pub use order::{MediaOrder, OrderId, OrderSet, OrderSnapshot, OrderType};

pub use mediashelf_core::{ListChange, ObservableList, TransactionError};
