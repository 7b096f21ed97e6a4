//! Container tree
//!
//! Machines → nozzle variants → materials. Material nodes are keyed by the
//! root material id (`base_file`) of the container they point at, so a
//! variant offers at most one container per material group.

use crate::model::MaterialNode;
pub use crate::stack::EMPTY_VARIANT_NAME;
use std::collections::BTreeMap;

/// Suffix of the 1.75 mm flavour of a root material id.
const DIAMETER_175_SUFFIX: &str = "_175";

/// Materials available for one nozzle of one machine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantNode {
    pub name: String,
    /// Root id of the machine's preferred material, copied from the machine
    pub machine_preferred_material: String,
    pub materials: BTreeMap<String, MaterialNode>,
}

impl VariantNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_material(&mut self, node: MaterialNode) {
        self.materials.insert(node.base_file().to_string(), node);
    }

    /// Material to load by default for filament of `approximate_diameter` mm
    pub fn preferred_material(&self, approximate_diameter: u32) -> Option<&MaterialNode> {
        let fits = |node: &&MaterialNode| {
            slicekit_core::approximate_diameter(node.approximate_diameter()) == approximate_diameter
        };

        if let Some(node) = self
            .materials
            .get(&self.machine_preferred_material)
            .filter(fits)
        {
            return Some(node);
        }

        if approximate_diameter == 2 {
            let id_175 = format!("{}{}", self.machine_preferred_material, DIAMETER_175_SUFFIX);
            if let Some(node) = self.materials.get(&id_175) {
                return Some(node);
            }
        }

        if let Some(node) = self.materials.values().find(fits) {
            tracing::warn!(
                "Preferred material {} is not available for {} mm filament in variant '{}', using {}",
                self.machine_preferred_material,
                approximate_diameter,
                self.name,
                node.container_id()
            );
            return Some(node);
        }

        let first = self.materials.values().next();
        if let Some(node) = first {
            tracing::warn!(
                "No material in variant '{}' fits {} mm filament, using {}",
                self.name,
                approximate_diameter,
                node.container_id()
            );
        }
        first
    }
}

/// One machine definition and its variants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineNode {
    pub definition_id: String,
    pub preferred_material: String,
    pub has_materials: bool,
    pub variants: BTreeMap<String, VariantNode>,
}

impl MachineNode {
    pub fn new(definition_id: impl Into<String>, preferred_material: impl Into<String>) -> Self {
        Self {
            definition_id: definition_id.into(),
            preferred_material: preferred_material.into(),
            has_materials: true,
            variants: BTreeMap::new(),
        }
    }

    pub fn add_variant(&mut self, mut variant: VariantNode) {
        variant.machine_preferred_material = self.preferred_material.clone();
        self.variants.insert(variant.name.clone(), variant);
    }

    /// Variant for `nozzle_name`; `None` selects the empty variant
    pub fn variant(&self, nozzle_name: Option<&str>) -> Option<&VariantNode> {
        self.variants.get(nozzle_name.unwrap_or(EMPTY_VARIANT_NAME))
    }

    pub fn first_variant(&self) -> Option<&VariantNode> {
        self.variants.values().next()
    }
}

/// All machines the application knows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerTree {
    pub machines: BTreeMap<String, MachineNode>,
}

impl ContainerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_machine(&mut self, machine: MachineNode) {
        self.machines.insert(machine.definition_id.clone(), machine);
    }

    pub fn machine(&self, definition_id: &str) -> Option<&MachineNode> {
        self.machines.get(definition_id)
    }
}
