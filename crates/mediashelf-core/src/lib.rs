//! Core systems for mediashelf.
//!
//! This crate provides the plumbing the library layer is built on:
//!
//! - **Signal/Slot System**: Type-safe observer callbacks
//! - **Observable Collections**: Ordered lists that report insertions and removals
//! - **Thread Affinity**: Checks that thread-bound state is used on its own thread
//! - **Logging**: `tracing` targets and span helpers shared by all crates
//!
//! # Signal/Slot Example
//!
//! ```
//! use mediashelf_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Observable List Example
//!
//! ```
//! use mediashelf_core::{ListChange, ObservableList};
//!
//! let list = ObservableList::new();
//! list.changed().connect(|change: &ListChange<&'static str>| {
//!     if let ListChange::Inserted { index, item } = change {
//!         println!("{item} inserted at {index}");
//!     }
//! });
//! list.push("artist");
//! ```

mod collection;
mod error;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use collection::{ListChange, ObservableList};
pub use error::{Result, TransactionError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
