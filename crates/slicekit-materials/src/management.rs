//! Material management
//!
//! Every mutation of material profiles goes through [`MaterialManagement`].
//! [`RegistryMaterialManagement`] applies them to a [`ContainerRegistry`]:
//! operations act on a whole material group (all containers sharing a
//! `base_file`), refuse to touch read-only or in-use materials, and report
//! problems through the log rather than to the caller.

use crate::model::{MaterialMetadata, MaterialNode};
use crate::registry::{material_in_use, ContainerRegistry, MaterialFilter};
use std::sync::Arc;

/// Id base for materials created from scratch
pub const CUSTOM_MATERIAL_ID: &str = "custom_material";
pub const CUSTOM_MATERIAL_NAME: &str = "Custom Material";
pub const CUSTOM_MATERIAL_BRAND: &str = "Custom";

/// Metadata fields to replace on every container of a duplicated group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverrides {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub guid: Option<String>,
    pub material: Option<String>,
    pub color_name: Option<String>,
    pub color_code: Option<String>,
}

impl MetadataOverrides {
    pub fn apply(&self, metadata: &mut MaterialMetadata) {
        let fields = [
            (&self.name, &mut metadata.name),
            (&self.brand, &mut metadata.brand),
            (&self.guid, &mut metadata.guid),
            (&self.material, &mut metadata.material),
            (&self.color_name, &mut metadata.color_name),
            (&self.color_code, &mut metadata.color_code),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
    }
}

pub trait MaterialManagement: Send + Sync {
    fn set_material_name(&self, node: &MaterialNode, name: &str);

    fn remove_material(&self, node: &MaterialNode);

    /// Copy the group rooted at `base_file`; returns the new root id
    fn duplicate_material_by_base_file(
        &self,
        base_file: &str,
        new_base_id: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> Option<String>;

    fn duplicate_material(
        &self,
        node: &MaterialNode,
        new_base_id: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> Option<String> {
        self.duplicate_material_by_base_file(node.base_file(), new_base_id, overrides)
    }

    /// Create a new editable material from the template; returns its root id
    fn create_material(&self) -> Option<String>;
}

/// [`MaterialManagement`] backed by a container registry
pub struct RegistryMaterialManagement {
    registry: Arc<dyn ContainerRegistry>,
    create_template: String,
}

impl RegistryMaterialManagement {
    pub fn new(registry: Arc<dyn ContainerRegistry>, create_template: impl Into<String>) -> Self {
        Self {
            registry,
            create_template: create_template.into(),
        }
    }

    fn group_metadata(&self, base_file: &str) -> Vec<MaterialMetadata> {
        self.registry
            .find_material_metadata(&MaterialFilter::new().base_file(base_file))
    }
}

impl MaterialManagement for RegistryMaterialManagement {
    fn set_material_name(&self, node: &MaterialNode, name: &str) {
        let root_id = node.base_file();
        if self.registry.is_read_only(root_id) {
            tracing::warn!("Cannot rename read-only material {}", root_id);
            return;
        }

        for metadata in self.group_metadata(root_id) {
            if let Err(e) = self.registry.set_material_name(&metadata.id, name) {
                tracing::warn!("Failed to rename {}: {}", metadata.id, e);
            }
        }
    }

    fn remove_material(&self, node: &MaterialNode) {
        let root_id = node.base_file();
        if material_in_use(self.registry.as_ref(), root_id) {
            tracing::warn!("Cannot remove material {}: it is in use", root_id);
            return;
        }

        for metadata in self.group_metadata(root_id) {
            if let Err(e) = self.registry.remove_container(&metadata.id) {
                tracing::warn!("Failed to remove {}: {}", metadata.id, e);
            }
        }
    }

    fn duplicate_material_by_base_file(
        &self,
        base_file: &str,
        new_base_id: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> Option<String> {
        let group = self.group_metadata(base_file);
        if !group.iter().any(|m| m.is_root()) {
            tracing::warn!("Cannot duplicate unknown material {}", base_file);
            return None;
        }

        let new_base_id = match new_base_id {
            Some(id) => id.to_string(),
            None => self.registry.unique_id(base_file),
        };

        // Root first, so derived containers never exist without it.
        let (roots, derived): (Vec<_>, Vec<_>) = group.into_iter().partition(|m| m.is_root());
        for (index, original) in roots.into_iter().chain(derived).enumerate() {
            let mut copy = original.clone();
            copy.id = original.id.replacen(base_file, &new_base_id, 1);
            copy.base_file = new_base_id.clone();
            if let Some(overrides) = overrides {
                overrides.apply(&mut copy);
            }

            if let Err(e) = self.registry.add_material(copy) {
                tracing::warn!("Failed to duplicate {}: {}", original.id, e);
                if index == 0 {
                    return None;
                }
            }
        }

        tracing::info!("Duplicated material {} as {}", base_file, new_base_id);
        Some(new_base_id)
    }

    fn create_material(&self) -> Option<String> {
        let new_id = self.registry.unique_id(CUSTOM_MATERIAL_ID);
        let overrides = MetadataOverrides {
            name: Some(CUSTOM_MATERIAL_NAME.to_string()),
            brand: Some(CUSTOM_MATERIAL_BRAND.to_string()),
            guid: Some(uuid::Uuid::new_v4().to_string()),
            ..Default::default()
        };
        self.duplicate_material_by_base_file(&self.create_template, Some(&new_id), Some(&overrides))
    }
}
