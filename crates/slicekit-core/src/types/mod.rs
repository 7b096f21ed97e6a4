//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<RwLock<T>>`, the shared event bus, etc.

pub mod aliases;

pub use aliases::*;
