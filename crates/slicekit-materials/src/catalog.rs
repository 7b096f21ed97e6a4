//! Material catalog files
//!
//! A catalog is a JSON document describing material profiles and the
//! machines that use them. It seeds an [`InMemoryRegistry`] and builds the
//! matching [`ContainerTree`].
//!
//! ```json
//! {
//!   "materials": [
//!     { "id": "generic_pla", "base_file": "generic_pla", "GUID": "...",
//!       "material": "PLA", "brand": "Generic", "approximate_diameter": 3,
//!       "read_only": true }
//!   ],
//!   "machines": [
//!     { "definition_id": "ultimaker3", "preferred_material": "generic_pla",
//!       "variants": { "AA 0.4": ["generic_pla"] },
//!       "extruders": [ { "id": "um3_left", "position": 0,
//!                        "variant": "AA 0.4", "material": "generic_pla" } ] }
//!   ]
//! }
//! ```

use crate::error::{MaterialError, MaterialResult};
use crate::model::{MaterialMetadata, MaterialNode, GENERIC_DEFINITION};
use crate::registry::{ContainerRegistry, InMemoryRegistry};
use crate::stack::{ExtruderStack, GlobalStack, VariantRef, EMPTY_VARIANT_NAME};
use crate::tree::{ContainerTree, MachineNode, VariantNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const VARIANT_CONTAINER_TYPE: &str = "variant";

fn default_true() -> bool {
    true
}

fn default_material_diameter() -> f64 {
    2.85
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMaterial {
    #[serde(flatten)]
    pub metadata: MaterialMetadata,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtruderSpec {
    pub id: String,
    pub position: usize,
    /// Nozzle name; absent for machines without nozzle variants
    #[serde(default)]
    pub variant: Option<String>,
    pub material: String,
    #[serde(default = "default_material_diameter")]
    pub material_diameter: f64,
}

impl ExtruderSpec {
    fn variant_id(definition_id: &str, nozzle: &str) -> String {
        format!("{}_{}", definition_id, nozzle.to_lowercase().replace([' ', '.'], ""))
    }

    pub fn to_stack(&self, definition_id: &str) -> ExtruderStack {
        let variant = match &self.variant {
            Some(nozzle) => VariantRef::new(Self::variant_id(definition_id, nozzle), nozzle.clone()),
            None => VariantRef::empty(),
        };
        ExtruderStack::new(&self.id, self.position, &self.material, self.material_diameter)
            .with_variant(variant)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub definition_id: String,
    pub preferred_material: String,
    #[serde(default = "default_true")]
    pub has_materials: bool,
    /// Nozzle name → material container ids. Without entries the machine
    /// gets a single `empty` variant offering every generic root material.
    #[serde(default)]
    pub variants: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub extruders: Vec<ExtruderSpec>,
}

impl MachineSpec {
    pub fn global_stack(&self) -> GlobalStack {
        let mut stack = GlobalStack::new(format!("{}_stack", self.definition_id), &self.definition_id);
        stack.has_materials = self.has_materials;
        stack.extruders = self
            .extruders
            .iter()
            .map(|e| e.to_stack(&self.definition_id))
            .collect();
        stack
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub materials: Vec<CatalogMaterial>,
    #[serde(default)]
    pub machines: Vec<MachineSpec>,
}

impl Catalog {
    pub fn load(path: &Path) -> MaterialResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            "Loaded catalog {} ({} materials, {} machines)",
            path.display(),
            catalog.materials.len(),
            catalog.machines.len()
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> MaterialResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Register all materials, nozzle variants, and extruder stacks
    pub fn populate(&self, registry: &InMemoryRegistry) -> MaterialResult<()> {
        for entry in &self.materials {
            if entry.read_only {
                registry.add_read_only_material(entry.metadata.clone())?;
            } else {
                registry.add_material(entry.metadata.clone())?;
            }
        }

        for machine in &self.machines {
            for nozzle in machine.variants.keys() {
                registry.add_container(
                    ExtruderSpec::variant_id(&machine.definition_id, nozzle),
                    VARIANT_CONTAINER_TYPE,
                )?;
            }
            for extruder in &machine.extruders {
                registry.add_extruder_stack(extruder.to_stack(&machine.definition_id));
            }
        }
        Ok(())
    }

    pub fn build_tree(&self) -> MaterialResult<ContainerTree> {
        let mut tree = ContainerTree::new();
        for spec in &self.machines {
            let mut machine = MachineNode::new(&spec.definition_id, &spec.preferred_material);
            machine.has_materials = spec.has_materials;

            if spec.variants.is_empty() {
                let mut variant = VariantNode::new(EMPTY_VARIANT_NAME);
                self.materials
                    .iter()
                    .map(|m| &m.metadata)
                    .filter(|m| m.is_root() && m.definition == GENERIC_DEFINITION)
                    .for_each(|m| variant.add_material(MaterialNode::new(m.clone())));
                machine.add_variant(variant);
            }

            for (nozzle, material_ids) in &spec.variants {
                let mut variant = VariantNode::new(nozzle);
                for id in material_ids {
                    let metadata = self.material(id).ok_or_else(|| {
                        MaterialError::Catalog(format!(
                            "variant '{}' of {} lists unknown material {}",
                            nozzle, spec.definition_id, id
                        ))
                    })?;
                    variant.add_material(MaterialNode::new(metadata.clone()));
                }
                machine.add_variant(variant);
            }

            tree.add_machine(machine);
        }
        Ok(tree)
    }

    pub fn global_stacks(&self) -> Vec<GlobalStack> {
        self.machines.iter().map(MachineSpec::global_stack).collect()
    }

    fn material(&self, id: &str) -> Option<&MaterialMetadata> {
        self.materials
            .iter()
            .map(|m| &m.metadata)
            .find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MaterialFilter;

    const CATALOG: &str = r#"{
        "materials": [
            { "id": "generic_pla", "base_file": "generic_pla", "GUID": "g-pla",
              "material": "PLA", "brand": "Generic", "approximate_diameter": 3,
              "read_only": true },
            { "id": "generic_pla_ultimaker3_AA_0.4", "base_file": "generic_pla",
              "GUID": "g-pla", "material": "PLA", "brand": "Generic",
              "definition": "ultimaker3", "approximate_diameter": 3,
              "read_only": true },
            { "id": "my_pla", "base_file": "my_pla", "GUID": "g-pla",
              "material": "PLA", "brand": "Mine", "approximate_diameter": 3 }
        ],
        "machines": [
            { "definition_id": "ultimaker3", "preferred_material": "generic_pla",
              "variants": { "AA 0.4": ["generic_pla_ultimaker3_AA_0.4", "my_pla"] },
              "extruders": [ { "id": "um3_left", "position": 0, "variant": "AA 0.4",
                               "material": "generic_pla_ultimaker3_AA_0.4" } ] },
            { "definition_id": "custom_fdm", "preferred_material": "generic_pla" }
        ]
    }"#;

    #[test]
    fn test_parse_and_populate() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let registry = InMemoryRegistry::new();
        catalog.populate(&registry).unwrap();

        assert_eq!(registry.material_count(), 3);
        assert!(registry.is_read_only("generic_pla"));
        assert!(!registry.is_read_only("my_pla"));
        assert_eq!(
            registry.find_container_ids("ultimaker3_aa04"),
            vec!["ultimaker3_aa04"]
        );

        let stacks = registry.extruder_stacks();
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].nozzle_name(), Some("AA 0.4"));
        assert_eq!(stacks[0].material_diameter, 2.85);

        let derived = registry
            .find_material_metadata(&MaterialFilter::new().definition("ultimaker3"));
        assert_eq!(derived.len(), 1);
    }

    #[test]
    fn test_build_tree() {
        let tree = Catalog::from_json(CATALOG).unwrap().build_tree().unwrap();

        let um3 = tree.machine("ultimaker3").unwrap();
        let variant = um3.variant(Some("AA 0.4")).unwrap();
        assert_eq!(
            variant.materials.keys().collect::<Vec<_>>(),
            vec!["generic_pla", "my_pla"]
        );
        assert_eq!(
            variant.materials["generic_pla"].container_id(),
            "generic_pla_ultimaker3_AA_0.4"
        );

        let custom = tree.machine("custom_fdm").unwrap();
        let empty = custom.variant(None).unwrap();
        assert_eq!(empty.materials.keys().collect::<Vec<_>>(), vec!["generic_pla", "my_pla"]);
    }

    #[test]
    fn test_unknown_variant_material_is_error() {
        let json = r#"{
            "machines": [ { "definition_id": "m", "preferred_material": "x",
                            "variants": { "AA 0.4": ["missing"] } } ]
        }"#;
        let err = Catalog::from_json(json).unwrap().build_tree().unwrap_err();
        assert!(matches!(err, MaterialError::Catalog(_)));
    }

    #[test]
    fn test_global_stacks() {
        let stacks = Catalog::from_json(CATALOG).unwrap().global_stacks();
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].definition_id, "ultimaker3");
        assert_eq!(stacks[0].extruders.len(), 1);
        assert!(stacks[1].has_materials);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();
        assert_eq!(Catalog::load(&path).unwrap().materials.len(), 3);

        assert!(matches!(
            Catalog::load(&dir.path().join("missing.json")),
            Err(MaterialError::IoError(_))
        ));
    }
}
