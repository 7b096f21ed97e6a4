//! Container stacks
//!
//! The active machine is a [`GlobalStack`] holding one [`ExtruderStack`]
//! per extruder. Only the parts material lookups read are modelled here.

use serde::{Deserialize, Serialize};
use slicekit_core::approximate_diameter;

/// Variant id meaning "no nozzle selected".
pub const EMPTY_VARIANT_ID: &str = "empty_variant";

/// Name of the empty variant, and of the single variant of machines
/// without nozzle variants.
pub const EMPTY_VARIANT_NAME: &str = "empty";

/// Reference to the nozzle variant container of an extruder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub id: String,
    pub name: String,
}

impl VariantRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(EMPTY_VARIANT_ID, EMPTY_VARIANT_NAME)
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_VARIANT_ID
    }
}

impl Default for VariantRef {
    fn default() -> Self {
        Self::empty()
    }
}

/// One extruder of the active machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtruderStack {
    pub id: String,
    pub position: usize,
    #[serde(default)]
    pub variant: VariantRef,
    /// Id of the material container currently loaded
    pub material_id: String,
    /// Filament diameter in millimetres
    pub material_diameter: f64,
}

impl ExtruderStack {
    pub fn new(
        id: impl Into<String>,
        position: usize,
        material_id: impl Into<String>,
        material_diameter: f64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            variant: VariantRef::empty(),
            material_id: material_id.into(),
            material_diameter,
        }
    }

    pub fn with_variant(mut self, variant: VariantRef) -> Self {
        self.variant = variant;
        self
    }

    /// Nozzle name, or `None` for the empty variant.
    pub fn nozzle_name(&self) -> Option<&str> {
        if self.variant.is_empty() {
            None
        } else {
            Some(&self.variant.name)
        }
    }

    /// Rounded diameter materials must declare to fit this extruder.
    pub fn compatible_material_diameter(&self) -> u32 {
        approximate_diameter(self.material_diameter)
    }
}

/// Extruder definition, consulted before the stack for the filament diameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtruderDefinition {
    pub id: String,
    pub material_diameter: f64,
}

impl ExtruderDefinition {
    pub fn new(id: impl Into<String>, material_diameter: f64) -> Self {
        Self {
            id: id.into(),
            material_diameter,
        }
    }
}

/// The active machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStack {
    pub id: String,
    pub definition_id: String,
    pub has_materials: bool,
    pub extruders: Vec<ExtruderStack>,
}

impl GlobalStack {
    pub fn new(id: impl Into<String>, definition_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            has_materials: true,
            extruders: Vec::new(),
        }
    }

    pub fn with_extruder(mut self, extruder: ExtruderStack) -> Self {
        self.extruders.push(extruder);
        self
    }

    pub fn without_materials(mut self) -> Self {
        self.has_materials = false;
        self
    }

    /// Extruder at `position`, by its declared position rather than list index
    pub fn extruder(&self, position: usize) -> Option<&ExtruderStack> {
        self.extruders.iter().find(|e| e.position == position)
    }
}
