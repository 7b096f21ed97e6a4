//! # SliceKit Materials
//!
//! Lookup tables over the material profiles held by the container registry.
//!
//! The [`MaterialIndex`] keeps four derived maps (group by root id, generic
//! fallback by material type, default-diameter root by root id, groups by
//! GUID) and rebuilds them wholesale, after a short debounce, whenever a
//! material container is added, removed, or changed. It answers material
//! queries against the [`ContainerTree`], keeps the user's favorite
//! materials in the preference store, and hands every mutation to a
//! [`MaterialManagement`] implementation.

pub mod catalog;
pub mod debounce;
pub mod error;
pub mod favorites;
pub mod index;
pub mod lookup;
pub mod management;
pub mod model;
pub mod registry;
pub mod stack;
pub mod tree;

pub use catalog::{Catalog, CatalogMaterial, ExtruderSpec, MachineSpec};
pub use debounce::DebounceTimer;
pub use error::{MaterialError, MaterialResult};
pub use favorites::Favorites;
pub use index::{MaterialIndex, DUPLICATE_FAILED};
pub use lookup::MaterialLookup;
pub use management::{MaterialManagement, MetadataOverrides, RegistryMaterialManagement};
pub use model::{
    MaterialGroup, MaterialMetadata, MaterialNode, GENERIC_DEFINITION, MATERIAL_CONTAINER_TYPE,
};
pub use registry::{ContainerRegistry, InMemoryRegistry, MaterialFilter};
pub use stack::{
    ExtruderDefinition, ExtruderStack, GlobalStack, VariantRef, EMPTY_VARIANT_ID, EMPTY_VARIANT_NAME,
};
pub use tree::{ContainerTree, MachineNode, VariantNode};
