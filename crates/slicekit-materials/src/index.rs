//! Material Index
//!
//! Facade over the material containers of the registry. It owns the derived
//! [`MaterialLookup`] tables, the favorites set, and the debounce timer that
//! collapses bursts of registry changes into one rebuild.
//!
//! The index subscribes to container events when constructed and
//! unsubscribes when dropped. Rebuilds happen only when the owning event
//! loop calls [`MaterialIndex::poll`] (or [`MaterialIndex::rebuild`]
//! directly), so all table updates occur on the caller's thread.

use crate::debounce::DebounceTimer;
use crate::error::{MaterialError, MaterialResult};
use crate::favorites::Favorites;
use crate::lookup::MaterialLookup;
use crate::management::{MaterialManagement, MetadataOverrides};
use crate::model::{MaterialGroup, MaterialMetadata, MaterialNode, MATERIAL_CONTAINER_TYPE};
use crate::registry::{material_in_use, ContainerRegistry, MaterialFilter};
use crate::stack::{ExtruderDefinition, ExtruderStack, GlobalStack};
use crate::tree::{ContainerTree, VariantNode};
use parking_lot::RwLock;
use slicekit_core::{
    approximate_diameter, diameters_match, thread_safe, thread_safe_rw, AppEvent, ContainerEvent,
    EventCategory, EventFilter, MaterialEvent, SharedBus, SubscriptionId, ThreadSafe, ThreadSafeRw,
};
use slicekit_settings::{MaterialSettings, PreferenceStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Returned by the duplication operations when the copy could not be made
pub const DUPLICATE_FAILED: &str = "ERROR";

fn restart_on_material_change(timer: &ThreadSafe<DebounceTimer>, event: &ContainerEvent) {
    if event.container_type() != MATERIAL_CONTAINER_TYPE {
        return;
    }
    tracing::trace!("{}, scheduling material update", event.description());
    timer.lock().start(Instant::now());
}

pub struct MaterialIndex {
    registry: Arc<dyn ContainerRegistry>,
    tree: Arc<ContainerTree>,
    preferences: Arc<dyn PreferenceStore>,
    management: Arc<dyn MaterialManagement>,
    bus: SharedBus,
    settings: MaterialSettings,
    lookup: ThreadSafeRw<MaterialLookup>,
    favorites: RwLock<Favorites>,
    timer: ThreadSafe<DebounceTimer>,
    subscription: SubscriptionId,
}

impl MaterialIndex {
    /// Wire up the index. The maps stay empty until the first rebuild.
    pub fn new(
        registry: Arc<dyn ContainerRegistry>,
        tree: Arc<ContainerTree>,
        preferences: Arc<dyn PreferenceStore>,
        management: Arc<dyn MaterialManagement>,
        bus: SharedBus,
        settings: MaterialSettings,
    ) -> Self {
        let favorites = preferences
            .get_value(&settings.favorites_key)
            .map(|value| Favorites::parse(&value))
            .unwrap_or_default();

        let timer = thread_safe(DebounceTimer::new(settings.update_interval()));
        let handler_timer = timer.clone();
        let subscription = bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Container]),
            move |event| {
                if let AppEvent::Container(event) = event {
                    restart_on_material_change(&handler_timer, &event);
                }
            },
        );

        tracing::debug!(
            "Material index created with {} favorites, update interval {:?}",
            favorites.len(),
            settings.update_interval()
        );

        Self {
            registry,
            tree,
            preferences,
            management,
            bus,
            settings,
            lookup: thread_safe_rw(MaterialLookup::default()),
            favorites: RwLock::new(favorites),
            timer,
            subscription,
        }
    }

    // ---- update cycle -------------------------------------------------

    /// React to a registry change; only material containers schedule an update
    pub fn on_container_changed(&self, event: &ContainerEvent) {
        restart_on_material_change(&self.timer, event);
    }

    /// Rebuild and announce if the debounce deadline has passed.
    ///
    /// Returns `true` when an update was performed.
    pub fn poll(&self, now: Instant) -> bool {
        if !self.timer.lock().poll(now) {
            return false;
        }
        self.rebuild();
        self.bus
            .publish(AppEvent::Material(MaterialEvent::MaterialsUpdated))
            .ok();
        true
    }

    /// When the pending update is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.lock().deadline()
    }

    pub fn has_pending_update(&self) -> bool {
        self.timer.lock().is_active()
    }

    /// Recompute all lookup tables from the registry
    pub fn rebuild(&self) {
        let lookup = MaterialLookup::build(
            self.registry.as_ref(),
            self.settings.default_quality_diameter,
        );
        *self.lookup.write() = lookup;
    }

    // ---- queries --------------------------------------------------------

    pub fn material_group(&self, root_material_id: &str) -> Option<MaterialGroup> {
        self.lookup.read().material_groups.get(root_material_id).cloned()
    }

    pub fn all_material_groups(&self) -> BTreeMap<String, MaterialGroup> {
        self.lookup.read().material_groups.clone()
    }

    /// Root id of the `approximate_diameter` flavour of `root_material_id`
    pub fn root_material_id_for_diameter(
        &self,
        root_material_id: &str,
        approximate_diameter: f64,
    ) -> String {
        let Some(base) = self
            .registry
            .find_material_metadata(&MaterialFilter::new().id(root_material_id))
            .into_iter()
            .next()
        else {
            tracing::warn!("Unknown root material {}", root_material_id);
            return root_material_id.to_string();
        };

        if diameters_match(base.approximate_diameter, approximate_diameter) {
            return root_material_id.to_string();
        }

        let filter = MaterialFilter::new()
            .brand(&base.brand)
            .definition(&base.definition)
            .material(&base.material)
            .color_name(&base.color_name)
            .approximate_diameter(approximate_diameter);
        self.registry
            .find_material_metadata(&filter)
            .into_iter()
            .find(|m| m.is_root())
            .map(|m| m.id)
            .unwrap_or_else(|| root_material_id.to_string())
    }

    /// Root id at the default diameter, or "" if unknown
    pub fn root_material_id_without_diameter(&self, root_material_id: &str) -> String {
        self.lookup
            .read()
            .diameter_materials
            .get(root_material_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn material_group_list_by_guid(&self, guid: &str) -> Option<Vec<MaterialGroup>> {
        self.lookup.read().guid_material_groups.get(guid).cloned()
    }

    fn variant_strict(
        &self,
        definition_id: &str,
        nozzle_name: Option<&str>,
    ) -> MaterialResult<&VariantNode> {
        let machine = self
            .tree
            .machine(definition_id)
            .ok_or_else(|| MaterialError::UnknownMachine {
                definition_id: definition_id.to_string(),
            })?;
        machine
            .variant(nozzle_name)
            .ok_or_else(|| MaterialError::UnknownVariant {
                definition_id: definition_id.to_string(),
                nozzle_name: nozzle_name.unwrap_or(crate::tree::EMPTY_VARIANT_NAME).to_string(),
            })
    }

    /// Materials of a machine/nozzle combination, keyed by root material id
    pub fn available_materials(
        &self,
        definition_id: &str,
        nozzle_name: Option<&str>,
    ) -> MaterialResult<BTreeMap<String, MaterialNode>> {
        Ok(self.variant_strict(definition_id, nozzle_name)?.materials.clone())
    }

    /// Materials that fit the extruder's nozzle and filament diameter
    pub fn available_materials_for_machine_extruder(
        &self,
        machine: &GlobalStack,
        extruder: &ExtruderStack,
    ) -> MaterialResult<BTreeMap<String, MaterialNode>> {
        let diameter = extruder.compatible_material_diameter();
        let mut materials = self.available_materials(&machine.definition_id, extruder.nozzle_name())?;
        materials.retain(|_, node| approximate_diameter(node.approximate_diameter()) == diameter);
        Ok(materials)
    }

    pub fn material_node(
        &self,
        definition_id: &str,
        nozzle_name: Option<&str>,
        buildplate_name: Option<&str>,
        approximate_diameter: f64,
        root_material_id: &str,
    ) -> Option<MaterialNode> {
        let Some(machine) = self.tree.machine(definition_id) else {
            tracing::warn!("No machine with definition {}", definition_id);
            return None;
        };
        let Some(variant) = machine.variant(nozzle_name) else {
            tracing::warn!(
                "Machine {} has no variant {:?}",
                definition_id,
                nozzle_name
            );
            return None;
        };
        let Some(node) = variant.materials.get(root_material_id) else {
            tracing::warn!(
                "Variant '{}' of {} has no material {} (buildplate {:?}, {} mm)",
                variant.name,
                definition_id,
                root_material_id,
                buildplate_name,
                approximate_diameter
            );
            return None;
        };
        Some(node.clone())
    }

    /// Look up a material for the extruder at `position` of `global_stack`.
    ///
    /// The extruder's own variant takes precedence over `nozzle_name`.
    pub fn material_node_by_type(
        &self,
        global_stack: &GlobalStack,
        position: usize,
        nozzle_name: Option<&str>,
        buildplate_name: Option<&str>,
        material_guid: &str,
    ) -> Option<MaterialNode> {
        let Some(extruder) = global_stack.extruder(position) else {
            tracing::warn!(
                "Machine {} has no extruder at position {}",
                global_stack.id,
                position
            );
            return None;
        };
        let nozzle = extruder.nozzle_name().or(nozzle_name);
        self.material_node(
            &global_stack.definition_id,
            nozzle,
            buildplate_name,
            f64::from(extruder.compatible_material_diameter()),
            material_guid,
        )
    }

    /// Root ids to try when `material` is unavailable, most preferred first
    pub fn fallback_material_ids_by_material(&self, material: &MaterialMetadata) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();

        if let Some(groups) = self.material_group_list_by_guid(&material.guid) {
            for group in groups.iter().filter(|g| g.name != material.id) {
                if group.is_read_only {
                    ids.insert(0, group.name.clone());
                } else {
                    ids.push(group.name.clone());
                }
            }
        }

        if let Some(fallback) = self.fallback_material_id_by_material_type(&material.material) {
            ids.push(fallback);
        }
        ids
    }

    /// Generic root id for `material_type`, at the default diameter
    pub fn fallback_material_id_by_material_type(&self, material_type: &str) -> Option<String> {
        let lookup = self.lookup.read();
        let Some(fallback) = lookup.fallback_materials.get(material_type) else {
            tracing::warn!("No fallback material for type {}", material_type);
            return None;
        };
        lookup.diameter_materials.get(&fallback.id).cloned()
    }

    /// Material to load into the extruder at `position` by default.
    ///
    /// Fails when the machine is unknown or has nothing to offer. A missing
    /// nozzle variant falls back to the machine's first variant.
    pub fn default_material(
        &self,
        global_stack: &GlobalStack,
        position: usize,
        nozzle_name: Option<&str>,
        extruder_definition: Option<&ExtruderDefinition>,
    ) -> MaterialResult<MaterialNode> {
        let definition_id = &global_stack.definition_id;
        let machine = self
            .tree
            .machine(definition_id)
            .ok_or_else(|| MaterialError::UnknownMachine {
                definition_id: definition_id.clone(),
            })?;

        let variant = match machine.variant(nozzle_name) {
            Some(variant) => variant,
            None => {
                tracing::warn!(
                    "Machine {} has no variant {:?}, using its first variant",
                    definition_id,
                    nozzle_name
                );
                machine
                    .first_variant()
                    .ok_or_else(|| MaterialError::NoVariants {
                        definition_id: definition_id.clone(),
                    })?
            }
        };

        let no_materials = || MaterialError::NoMaterials {
            definition_id: definition_id.clone(),
            variant: variant.name.clone(),
        };

        if !global_stack.has_materials {
            return variant.materials.values().next().cloned().ok_or_else(no_materials);
        }

        let diameter = match extruder_definition {
            Some(definition) => definition.material_diameter,
            None => {
                global_stack
                    .extruder(position)
                    .ok_or(MaterialError::ExtruderOutOfRange {
                        position,
                        count: global_stack.extruders.len(),
                    })?
                    .material_diameter
            }
        };

        variant
            .preferred_material(approximate_diameter(diameter))
            .cloned()
            .ok_or_else(no_materials)
    }

    // ---- mutations --------------------------------------------------------

    /// Remove every container with id `root_material_id`
    pub fn remove_material_by_root_id(&self, root_material_id: &str) {
        let ids = self.registry.find_container_ids(root_material_id);
        if ids.is_empty() {
            self.registry.add_wrong_container_id(root_material_id);
            return;
        }
        for id in ids {
            if let Err(e) = self.registry.remove_container(&id) {
                tracing::warn!("Failed to remove container {}: {}", id, e);
            }
        }
    }

    /// `false` while any extruder has a material of this group loaded
    pub fn can_material_be_removed(&self, node: &MaterialNode) -> bool {
        !material_in_use(self.registry.as_ref(), node.base_file())
    }

    pub fn set_material_name(&self, node: &MaterialNode, name: &str) {
        self.management.set_material_name(node, name);
    }

    pub fn remove_material(&self, node: &MaterialNode) {
        self.management.remove_material(node);
    }

    pub fn duplicate_material_by_root_id(
        &self,
        root_material_id: &str,
        new_base_id: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> String {
        self.management
            .duplicate_material_by_base_file(root_material_id, new_base_id, overrides)
            .unwrap_or_else(|| DUPLICATE_FAILED.to_string())
    }

    pub fn duplicate_material(
        &self,
        node: &MaterialNode,
        new_base_id: Option<&str>,
        overrides: Option<&MetadataOverrides>,
    ) -> String {
        self.management
            .duplicate_material(node, new_base_id, overrides)
            .unwrap_or_else(|| DUPLICATE_FAILED.to_string())
    }

    pub fn create_material(&self) -> String {
        self.management
            .create_material()
            .unwrap_or_else(|| DUPLICATE_FAILED.to_string())
    }

    // ---- favorites --------------------------------------------------------

    pub fn add_favorite(&self, root_material_id: &str) {
        self.favorites.write().insert(root_material_id);
        self.favorites_changed();
    }

    pub fn remove_favorite(&self, root_material_id: &str) {
        if !self.favorites.write().remove(root_material_id) {
            tracing::warn!(
                "Material {} is not a favorite, cannot remove it",
                root_material_id
            );
            return;
        }
        self.favorites_changed();
    }

    pub fn favorites(&self) -> Vec<String> {
        self.favorites.read().to_vec()
    }

    pub fn is_favorite(&self, root_material_id: &str) -> bool {
        self.favorites.read().contains(root_material_id)
    }

    fn favorites_changed(&self) {
        let value = self.favorites.read().join();
        self.bus
            .publish(AppEvent::Material(MaterialEvent::MaterialsUpdated))
            .ok();
        self.preferences.set_value(&self.settings.favorites_key, &value);
        if let Err(e) = self.preferences.save_settings() {
            tracing::warn!("Failed to save favorite materials: {}", e);
        }
    }
}

impl Drop for MaterialIndex {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

impl std::fmt::Debug for MaterialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialIndex")
            .field("groups", &self.lookup.read().material_groups.len())
            .field("favorites", &self.favorites.read().len())
            .field("pending_update", &self.has_pending_update())
            .finish()
    }
}
