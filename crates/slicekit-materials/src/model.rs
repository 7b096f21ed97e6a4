//! Material profile data model.
//!
//! [`MaterialMetadata`] is the typed record the registry keeps for every
//! material container. Records sharing a `base_file` form a
//! [`MaterialGroup`]: the record whose id equals the base file is the root,
//! the rest are machine or nozzle specific derivations of it.

use serde::{Deserialize, Serialize};
use slicekit_core::{approximate_diameter, ContainerError};

/// Container type string carried by every material container.
pub const MATERIAL_CONTAINER_TYPE: &str = "material";

/// Definition id used by materials that are not bound to a machine.
pub const GENERIC_DEFINITION: &str = "fdmprinter";

fn default_container_type() -> String {
    MATERIAL_CONTAINER_TYPE.to_string()
}

fn default_definition() -> String {
    GENERIC_DEFINITION.to_string()
}

/// Metadata of a single material container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMetadata {
    pub id: String,
    pub base_file: String,
    #[serde(rename = "GUID", default)]
    pub guid: String,
    /// Material type, e.g. "PLA".
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color_name: String,
    #[serde(default)]
    pub color_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_definition")]
    pub definition: String,
    pub approximate_diameter: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(rename = "type", default = "default_container_type")]
    pub container_type: String,
}

impl MaterialMetadata {
    /// Create a generic 2.85 mm (approximately 3) record.
    pub fn new(id: impl Into<String>, base_file: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            base_file: base_file.into(),
            guid: String::new(),
            material: String::new(),
            brand: String::new(),
            color_name: String::new(),
            color_code: String::new(),
            definition: default_definition(),
            approximate_diameter: 3.0,
            variant_name: None,
            container_type: default_container_type(),
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color_name: impl Into<String>, color_code: impl Into<String>) -> Self {
        self.color_name = color_name.into();
        self.color_code = color_code.into();
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_variant(mut self, variant_name: impl Into<String>) -> Self {
        self.variant_name = Some(variant_name.into());
        self
    }

    pub fn with_approximate_diameter(mut self, diameter: f64) -> Self {
        self.approximate_diameter = diameter;
        self
    }

    /// Whether this record is the root of its group.
    pub fn is_root(&self) -> bool {
        self.id == self.base_file
    }

    pub fn is_material(&self) -> bool {
        self.container_type == MATERIAL_CONTAINER_TYPE
    }

    /// Diameter rounded to whole millimetres.
    pub fn approximate_diameter_mm(&self) -> u32 {
        approximate_diameter(self.approximate_diameter)
    }

    /// Reject records the registry must never hold.
    pub fn validate(&self) -> Result<(), ContainerError> {
        let invalid = |reason: &str| ContainerError::InvalidMetadata {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.base_file.trim().is_empty() {
            return Err(invalid("base_file must not be empty"));
        }
        if !self.approximate_diameter.is_finite() || self.approximate_diameter <= 0.0 {
            return Err(invalid("approximate_diameter must be a positive number"));
        }
        Ok(())
    }
}

/// Leaf of the container tree pointing at one material container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialNode {
    pub metadata: MaterialMetadata,
}

impl MaterialNode {
    pub fn new(metadata: MaterialMetadata) -> Self {
        Self { metadata }
    }

    pub fn container_id(&self) -> &str {
        &self.metadata.id
    }

    /// Root material id of the group this node belongs to.
    pub fn base_file(&self) -> &str {
        &self.metadata.base_file
    }

    pub fn guid(&self) -> &str {
        &self.metadata.guid
    }

    pub fn material_type(&self) -> &str {
        &self.metadata.material
    }

    pub fn approximate_diameter(&self) -> f64 {
        self.metadata.approximate_diameter
    }
}

impl From<MaterialMetadata> for MaterialNode {
    fn from(metadata: MaterialMetadata) -> Self {
        Self::new(metadata)
    }
}

/// A root material and every container derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup {
    /// Root material id.
    pub name: String,
    /// Built-in profiles cannot be edited or removed.
    pub is_read_only: bool,
    pub root_material_node: MaterialNode,
    pub derived_material_node_list: Vec<MaterialNode>,
}

impl MaterialGroup {
    pub fn new(name: impl Into<String>, root: MaterialNode, is_read_only: bool) -> Self {
        Self {
            name: name.into(),
            is_read_only,
            root_material_node: root,
            derived_material_node_list: Vec::new(),
        }
    }

    /// Root node followed by the derived nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &MaterialNode> {
        std::iter::once(&self.root_material_node).chain(self.derived_material_node_list.iter())
    }

    pub fn node_count(&self) -> usize {
        1 + self.derived_material_node_list.len()
    }
}
