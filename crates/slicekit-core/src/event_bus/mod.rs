//! # Event Bus Module
//!
//! Provides the event bus used for decoupled change notification between
//! the container registry, the material index, and the settings layer.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Supports both synchronous handlers and async broadcast receivers
//!
//! There is no global bus instance. One bus is created at application
//! wiring time and handed to every component that publishes or listens.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slicekit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, MaterialEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Material]),
//!     |event| {
//!         if let AppEvent::Material(MaterialEvent::MaterialsUpdated) = event {
//!             println!("material lookup tables changed");
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Material(MaterialEvent::MaterialsUpdated)).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
