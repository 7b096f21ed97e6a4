//! # SliceKit
//!
//! Material profile index for a 3D printing slicer.
//!
//! ## Architecture
//!
//! SliceKit is organized as a workspace with multiple crates:
//!
//! 1. **slicekit-core** - Error types, event bus, shared type aliases, filament units
//! 2. **slicekit-settings** - Configuration file and preference store
//! 3. **slicekit-materials** - Material lookup tables, container tree, favorites, management
//! 4. **slicekit** - Command line front end that wires the crates together
//!
//! ## Features
//!
//! - **Lookup Tables**: groups by root id, generic fallbacks by type, diameter variants, groups by GUID
//! - **Debounced Updates**: bursts of registry changes collapse into one rebuild
//! - **Favorites**: persisted in the preference store as a sorted `;`-joined list
//! - **Profile Management**: create, duplicate, rename, and remove material groups

pub use slicekit_core::{
    shared_bus, AppEvent, ContainerError, ContainerEvent, Error, EventBus, EventBusConfig,
    EventCategory, EventFilter, FilamentSize, MaterialEvent, Result, SettingsEvent, SharedBus,
    SubscriptionId,
};

pub use slicekit_settings::{
    Config, MaterialSettings, PreferenceStore, Preferences, SettingsError, SettingsManager,
};

pub use slicekit_materials::{
    Catalog, ContainerRegistry, ContainerTree, ExtruderStack, GlobalStack, InMemoryRegistry,
    MaterialError, MaterialGroup, MaterialIndex, MaterialManagement, MaterialMetadata,
    MaterialNode, RegistryMaterialManagement, DUPLICATE_FAILED,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatted output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Wire a [`MaterialIndex`] over `registry` and `tree`.
///
/// The index is subscribed to `bus` before the caller populates the
/// registry, so registry changes schedule a debounced rebuild.
pub fn build_index(
    registry: std::sync::Arc<InMemoryRegistry>,
    tree: ContainerTree,
    preferences: std::sync::Arc<Preferences>,
    bus: SharedBus,
) -> MaterialIndex {
    let settings = preferences.config().materials;
    let management = std::sync::Arc::new(RegistryMaterialManagement::new(
        registry.clone(),
        settings.create_template.clone(),
    ));
    MaterialIndex::new(
        registry,
        std::sync::Arc::new(tree),
        preferences,
        management,
        bus,
        settings,
    )
}
