//! Container registry
//!
//! The registry owns every container the application knows about. Material
//! containers are held with their typed metadata; other containers (variants,
//! qualities, definitions) are tracked by id and type only, which is all the
//! material lookups need from them.
//!
//! [`InMemoryRegistry`] publishes a [`ContainerEvent`] on the event bus for
//! every add, remove, and metadata change.

use crate::model::{MaterialMetadata, MATERIAL_CONTAINER_TYPE};
use crate::stack::ExtruderStack;
use parking_lot::RwLock;
use slicekit_core::{AppEvent, ContainerError, ContainerEvent, SharedBus};
use std::collections::HashSet;

/// Field filter for material metadata queries. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilter {
    pub id: Option<String>,
    pub base_file: Option<String>,
    pub guid: Option<String>,
    pub material: Option<String>,
    pub brand: Option<String>,
    pub color_name: Option<String>,
    pub definition: Option<String>,
    pub approximate_diameter: Option<f64>,
}

impl MaterialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn base_file(mut self, base_file: impl Into<String>) -> Self {
        self.base_file = Some(base_file.into());
        self
    }

    pub fn guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn color_name(mut self, color_name: impl Into<String>) -> Self {
        self.color_name = Some(color_name.into());
        self
    }

    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn approximate_diameter(mut self, diameter: f64) -> Self {
        self.approximate_diameter = Some(diameter);
        self
    }

    pub fn matches(&self, metadata: &MaterialMetadata) -> bool {
        fn field(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |e| e == actual)
        }

        field(&self.id, &metadata.id)
            && field(&self.base_file, &metadata.base_file)
            && field(&self.guid, &metadata.guid)
            && field(&self.material, &metadata.material)
            && field(&self.brand, &metadata.brand)
            && field(&self.color_name, &metadata.color_name)
            && field(&self.definition, &metadata.definition)
            && self.approximate_diameter.map_or(true, |d| {
                slicekit_core::diameters_match(d, metadata.approximate_diameter)
            })
    }
}

/// Queries and mutations the material subsystem needs from the registry
pub trait ContainerRegistry: Send + Sync {
    /// Material metadata matching `filter`, in registration order
    fn find_material_metadata(&self, filter: &MaterialFilter) -> Vec<MaterialMetadata>;

    /// Ids of all containers of any type whose id is `id`
    fn find_container_ids(&self, id: &str) -> Vec<String>;

    fn is_read_only(&self, container_id: &str) -> bool;

    fn add_material(&self, metadata: MaterialMetadata) -> Result<(), ContainerError>;

    fn remove_container(&self, container_id: &str) -> Result<(), ContainerError>;

    fn set_material_name(&self, container_id: &str, name: &str) -> Result<(), ContainerError>;

    /// Remember an id that was asked for but does not exist
    fn add_wrong_container_id(&self, container_id: &str);

    /// All extruder stacks of all machines
    fn extruder_stacks(&self) -> Vec<ExtruderStack>;

    /// `base` if no container uses it, otherwise `base` with the first free numeric suffix
    fn unique_id(&self, base: &str) -> String;
}

/// Whether any extruder has a material from group `base_file` loaded
pub fn material_in_use(registry: &dyn ContainerRegistry, base_file: &str) -> bool {
    let ids: HashSet<String> = registry
        .find_material_metadata(&MaterialFilter::new().base_file(base_file))
        .into_iter()
        .map(|m| m.id)
        .collect();

    registry
        .extruder_stacks()
        .iter()
        .any(|stack| ids.contains(&stack.material_id))
}

#[derive(Default)]
struct RegistryState {
    materials: Vec<MaterialMetadata>,
    /// Non-material containers as (id, type)
    containers: Vec<(String, String)>,
    read_only: HashSet<String>,
    wrong_container_ids: Vec<String>,
    extruder_stacks: Vec<ExtruderStack>,
}

impl RegistryState {
    fn contains(&self, id: &str) -> bool {
        self.materials.iter().any(|m| m.id == id)
            || self.containers.iter().any(|(cid, _)| cid == id)
    }
}

/// Registry held entirely in memory
#[derive(Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
    bus: Option<SharedBus>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that announces container changes on `bus`
    pub fn with_bus(bus: SharedBus) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            bus: Some(bus),
        }
    }

    /// Register a built-in material that cannot be edited or removed
    pub fn add_read_only_material(&self, metadata: MaterialMetadata) -> Result<(), ContainerError> {
        let id = metadata.id.clone();
        self.add_material(metadata)?;
        self.state.write().read_only.insert(id);
        Ok(())
    }

    /// Register a non-material container
    pub fn add_container(
        &self,
        id: impl Into<String>,
        container_type: impl Into<String>,
    ) -> Result<(), ContainerError> {
        let id = id.into();
        let container_type = container_type.into();
        {
            let mut state = self.state.write();
            if state.contains(&id) {
                return Err(ContainerError::AlreadyExists { id });
            }
            state.containers.push((id.clone(), container_type.clone()));
        }
        self.notify(ContainerEvent::Added { id, container_type });
        Ok(())
    }

    pub fn add_extruder_stack(&self, stack: ExtruderStack) {
        self.state.write().extruder_stacks.push(stack);
    }

    /// Load `material_id` into the extruder stack `stack_id`
    pub fn set_active_material(&self, stack_id: &str, material_id: &str) -> Result<(), ContainerError> {
        let mut state = self.state.write();
        let stack = state
            .extruder_stacks
            .iter_mut()
            .find(|s| s.id == stack_id)
            .ok_or_else(|| ContainerError::NotFound {
                id: stack_id.to_string(),
            })?;
        stack.material_id = material_id.to_string();
        Ok(())
    }

    /// Ids recorded by [`ContainerRegistry::add_wrong_container_id`]
    pub fn wrong_container_ids(&self) -> Vec<String> {
        self.state.read().wrong_container_ids.clone()
    }

    pub fn material_count(&self) -> usize {
        self.state.read().materials.len()
    }

    fn notify(&self, event: ContainerEvent) {
        tracing::trace!("{}", event.description());
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Container(event)).ok();
        }
    }
}

impl ContainerRegistry for InMemoryRegistry {
    fn find_material_metadata(&self, filter: &MaterialFilter) -> Vec<MaterialMetadata> {
        self.state
            .read()
            .materials
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect()
    }

    fn find_container_ids(&self, id: &str) -> Vec<String> {
        let state = self.state.read();
        state
            .materials
            .iter()
            .map(|m| &m.id)
            .chain(state.containers.iter().map(|(cid, _)| cid))
            .filter(|cid| cid.as_str() == id)
            .cloned()
            .collect()
    }

    fn is_read_only(&self, container_id: &str) -> bool {
        self.state.read().read_only.contains(container_id)
    }

    fn add_material(&self, metadata: MaterialMetadata) -> Result<(), ContainerError> {
        metadata.validate()?;
        let id = metadata.id.clone();
        {
            let mut state = self.state.write();
            if state.contains(&id) {
                return Err(ContainerError::AlreadyExists { id });
            }
            state.materials.push(metadata);
        }
        self.notify(ContainerEvent::Added {
            id,
            container_type: MATERIAL_CONTAINER_TYPE.to_string(),
        });
        Ok(())
    }

    fn remove_container(&self, container_id: &str) -> Result<(), ContainerError> {
        let container_type = {
            let mut state = self.state.write();
            if state.read_only.contains(container_id) {
                return Err(ContainerError::ReadOnly {
                    id: container_id.to_string(),
                });
            }
            if let Some(pos) = state.materials.iter().position(|m| m.id == container_id) {
                state.materials.remove(pos);
                MATERIAL_CONTAINER_TYPE.to_string()
            } else if let Some(pos) = state.containers.iter().position(|(id, _)| id == container_id) {
                state.containers.remove(pos).1
            } else {
                return Err(ContainerError::NotFound {
                    id: container_id.to_string(),
                });
            }
        };
        self.notify(ContainerEvent::Removed {
            id: container_id.to_string(),
            container_type,
        });
        Ok(())
    }

    fn set_material_name(&self, container_id: &str, name: &str) -> Result<(), ContainerError> {
        {
            let mut state = self.state.write();
            if state.read_only.contains(container_id) {
                return Err(ContainerError::ReadOnly {
                    id: container_id.to_string(),
                });
            }
            let metadata = state
                .materials
                .iter_mut()
                .find(|m| m.id == container_id)
                .ok_or_else(|| ContainerError::NotFound {
                    id: container_id.to_string(),
                })?;
            metadata.name = name.to_string();
        }
        self.notify(ContainerEvent::MetadataChanged {
            id: container_id.to_string(),
            container_type: MATERIAL_CONTAINER_TYPE.to_string(),
        });
        Ok(())
    }

    fn add_wrong_container_id(&self, container_id: &str) {
        tracing::warn!("Container {} does not exist", container_id);
        self.state
            .write()
            .wrong_container_ids
            .push(container_id.to_string());
    }

    fn extruder_stacks(&self) -> Vec<ExtruderStack> {
        self.state.read().extruder_stacks.clone()
    }

    fn unique_id(&self, base: &str) -> String {
        let state = self.state.read();
        if !state.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !state.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryRegistry")
            .field("materials", &state.materials.len())
            .field("containers", &state.containers.len())
            .field("read_only", &state.read_only.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicekit_core::{shared_bus, EventBus, EventCategory, EventFilter};
    use std::sync::{Arc, Mutex};

    fn pla() -> MaterialMetadata {
        MaterialMetadata::new("generic_pla", "generic_pla")
            .with_material("PLA")
            .with_brand("Generic")
            .with_guid("guid-pla")
    }

    #[test]
    fn test_filter_matching() {
        let metadata = pla();
        assert!(MaterialFilter::new().matches(&metadata));
        assert!(MaterialFilter::new().material("PLA").brand("Generic").matches(&metadata));
        assert!(!MaterialFilter::new().material("ABS").matches(&metadata));
        assert!(MaterialFilter::new().approximate_diameter(3.0).matches(&metadata));
        assert!(!MaterialFilter::new().approximate_diameter(2.0).matches(&metadata));
    }

    #[test]
    fn test_add_and_find() {
        let registry = InMemoryRegistry::new();
        registry.add_material(pla()).unwrap();
        registry
            .add_material(MaterialMetadata::new("generic_pla_um3", "generic_pla"))
            .unwrap();

        let group = registry.find_material_metadata(&MaterialFilter::new().base_file("generic_pla"));
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].id, "generic_pla");
        assert_eq!(registry.find_container_ids("generic_pla"), vec!["generic_pla"]);
        assert!(registry.find_container_ids("nope").is_empty());
    }

    #[test]
    fn test_duplicate_and_invalid_rejected() {
        let registry = InMemoryRegistry::new();
        registry.add_material(pla()).unwrap();

        let err = registry.add_material(pla()).unwrap_err();
        assert!(matches!(err, ContainerError::AlreadyExists { .. }));

        let err = registry
            .add_material(MaterialMetadata::new("bad", "bad").with_approximate_diameter(-1.0))
            .unwrap_err();
        assert!(matches!(err, ContainerError::InvalidMetadata { .. }));
        assert_eq!(registry.material_count(), 1);
    }

    #[test]
    fn test_read_only_protection() {
        let registry = InMemoryRegistry::new();
        registry.add_read_only_material(pla()).unwrap();
        assert!(registry.is_read_only("generic_pla"));

        assert!(matches!(
            registry.remove_container("generic_pla"),
            Err(ContainerError::ReadOnly { .. })
        ));
        assert!(matches!(
            registry.set_material_name("generic_pla", "Renamed"),
            Err(ContainerError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_unique_id() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.unique_id("custom_material"), "custom_material");

        registry
            .add_material(MaterialMetadata::new("custom_material", "custom_material"))
            .unwrap();
        registry.add_container("custom_material_2", "quality").unwrap();
        assert_eq!(registry.unique_id("custom_material"), "custom_material_3");
    }

    #[test]
    fn test_material_in_use() {
        let registry = InMemoryRegistry::new();
        registry.add_material(pla()).unwrap();
        registry
            .add_material(MaterialMetadata::new("generic_pla_um3", "generic_pla"))
            .unwrap();
        registry.add_extruder_stack(ExtruderStack::new("left", 0, "generic_abs", 2.85));
        assert!(!material_in_use(&registry, "generic_pla"));

        registry.set_active_material("left", "generic_pla_um3").unwrap();
        assert!(material_in_use(&registry, "generic_pla"));
        assert!(registry.set_active_material("missing", "generic_pla").is_err());
    }

    #[test]
    fn test_events_published() {
        let bus = shared_bus(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Container]),
            move |event| {
                if let AppEvent::Container(e) = event {
                    s.lock().unwrap().push(e.description());
                }
            },
        );

        let registry = InMemoryRegistry::with_bus(bus);
        registry.add_material(pla()).unwrap();
        registry.set_material_name("generic_pla", "PLA").unwrap();
        registry.add_container("ultimaker3_aa04", "variant").unwrap();
        registry.remove_container("ultimaker3_aa04").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "Added material container generic_pla".to_string(),
                "Metadata of material container generic_pla changed".to_string(),
                "Added variant container ultimaker3_aa04".to_string(),
                "Removed variant container ultimaker3_aa04".to_string(),
            ]
        );
    }
}
