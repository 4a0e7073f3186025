//! Observer callbacks.
//!
//! A [`Signal`] holds a table of slots (closures) and calls each of them,
//! in connection order, every time it is emitted. Slots run synchronously on
//! the emitting thread.
//!
//! The slot table is snapshotted before an emission and unlocked while the
//! slots run, so a slot may connect, disconnect, or re-emit on the signal it
//! was called from. Slots connected during an emission first run on the next
//! one.
//!
//! ```
//! use mediashelf_core::Signal;
//!
//! let track_added = Signal::<String>::new();
//! let id = track_added.connect(|title| println!("added {title}"));
//!
//! track_added.emit("Lullaby".to_string());
//! assert!(track_added.disconnect(id));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Names one connection on a [`Signal`]; pass it to
    /// [`Signal::disconnect`] to remove the slot.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of callbacks invoked with `&Args` on every emission.
///
/// Use `()` for signals that carry no payload. The signal is `Send + Sync`;
/// slots must be as well.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal with no slots.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Registers `slot`, returning the id that removes it again.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Removes one slot. Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Removes every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// While blocked, [`emit`](Self::emit) does nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Calls every connected slot with `args`.
    #[tracing::instrument(skip_all, target = "mediashelf_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "blocked; emission dropped");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emitting");

        for slot in slots {
            slot(&args);
        }
    }

    /// Like [`connect`](Self::connect), but the slot is removed when the
    /// returned guard drops.
    ///
    /// The guard only holds a weak reference to the signal.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: Arc::downgrade(self),
            id,
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::Relaxed))
            .finish()
    }
}

/// Owns one connection and removes it on drop.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use mediashelf_core::Signal;
///
/// let rescanned = Arc::new(Signal::<usize>::new());
/// let total = Arc::new(AtomicUsize::new(0));
///
/// let sink = total.clone();
/// let guard = rescanned.connect_scoped(move |&n| {
///     sink.fetch_add(n, Ordering::SeqCst);
/// });
/// rescanned.emit(12);
/// drop(guard);
/// rescanned.emit(30);
///
/// assert_eq!(total.load(Ordering::SeqCst), 12);
/// ```
pub struct ConnectionGuard<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the signal is alive and still holds the connection.
    pub fn is_connected(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|signal| signal.connections.lock().contains_key(self.id))
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

impl<Args: 'static> std::fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn collector<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |value: &T| sink.lock().push(value.clone()));
        seen
    }

    #[test]
    fn test_slots_see_every_emission() {
        let ratings = Signal::<u8>::new();
        let seen = collector(&ratings);

        ratings.emit(3);
        ratings.emit(5);
        assert_eq!(*seen.lock(), vec![3, 5]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let ratings = Signal::<u8>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = ratings.connect(move |&r| sink.lock().push(r));

        ratings.emit(1);
        assert!(ratings.disconnect(id));
        assert!(!ratings.disconnect(id));
        ratings.emit(2);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_blocked_signal_drops_emissions() {
        let titles = Signal::<&'static str>::new();
        let seen = collector(&titles);

        titles.set_blocked(true);
        titles.emit("Words");
        assert!(titles.is_blocked());
        titles.set_blocked(false);
        titles.emit("Lullaby");

        assert_eq!(*seen.lock(), vec!["Lullaby"]);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            signal.connect(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_guard_disconnects_on_drop() {
        let signal = Arc::new(Signal::<u32>::new());
        let guard = signal.connect_scoped(|_| {});
        assert!(guard.is_connected());
        assert_eq!(signal.connection_count(), 1);

        drop(guard);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_guard_tolerates_dropped_signal() {
        let signal = Arc::new(Signal::<()>::new());
        let guard = signal.connect_scoped(|_| {});
        drop(signal);
        assert!(!guard.is_connected());
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&signal);
        let calls_inner = calls.clone();
        let own_id_inner = own_id.clone();
        let id = signal.connect(move |_| {
            calls_inner.fetch_add(1, Ordering::SeqCst);
            if let (Some(signal), Some(id)) = (weak.upgrade(), *own_id_inner.lock()) {
                signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
