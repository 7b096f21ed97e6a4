//! Type aliases for commonly used shared-state types.
//!
//! Components in SliceKit are wired together at startup and shared by
//! reference counting. These aliases name the handful of wrappers that
//! appear in constructor signatures across the crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slicekit_core::types::*;
//!
//! let bus: SharedBus = shared_bus(EventBus::new());
//! let favorites: ThreadSafeRw<BTreeSet<String>> = thread_safe_rw(BTreeSet::new());
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::event_bus::EventBus;

/// A thread-safe, mutex-protected wrapper.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy state.
///
/// The material lookup tables are read by every query and written only on
/// rebuild, which is exactly this access pattern.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// The application event bus as handed to publishers and listeners.
pub type SharedBus = Arc<EventBus>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

/// Wrap an event bus for sharing.
#[inline]
pub fn shared_bus(bus: EventBus) -> SharedBus {
    Arc::new(bus)
}
