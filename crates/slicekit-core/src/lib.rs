//! # SliceKit Core
//!
//! Core types, events, and utilities shared by the SliceKit crates.
//! Provides the error hierarchy, the application event bus used for
//! change notification, shared-state type aliases, and filament
//! diameter helpers.

pub mod error;
pub mod event_bus;
pub mod types;
pub mod units;

pub use error::{ContainerError, Error, Result};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, ContainerEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    MaterialEvent, SettingsEvent, SubscriptionId,
};

// Re-export type aliases for convenience
pub use types::{shared_bus, thread_safe, thread_safe_rw, SharedBus, ThreadSafe, ThreadSafeRw};

pub use units::{
    approximate_diameter, diameters_match, format_diameter, parse_diameter, FilamentSize,
};
