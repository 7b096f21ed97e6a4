//! Derived material lookup tables.
//!
//! [`MaterialLookup::build`] is a pure function of the registry contents.
//! It is rerun in full on every relevant registry change; the tables are
//! never patched incrementally.

use crate::model::{MaterialGroup, MaterialMetadata, MaterialNode};
use crate::registry::{ContainerRegistry, MaterialFilter};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Brand of the generic fallback materials, compared case-insensitively.
pub const GENERIC_BRAND: &str = "generic";

/// The four derived maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLookup {
    /// Root material id → group
    pub material_groups: BTreeMap<String, MaterialGroup>,
    /// Material type → generic root material
    pub fallback_materials: HashMap<String, MaterialMetadata>,
    /// Root material id → root material id at the default diameter
    pub diameter_materials: HashMap<String, String>,
    /// GUID → groups, read-only groups first
    pub guid_material_groups: HashMap<String, Vec<MaterialGroup>>,
}

impl MaterialLookup {
    /// Build all maps from the registry's material containers
    pub fn build(registry: &dyn ContainerRegistry, default_quality_diameter: u32) -> Self {
        let all = registry.find_material_metadata(&MaterialFilter::new());

        let material_groups = build_groups(registry, &all);

        // Roots in registration order; every map that depends on insertion
        // order is built from this list.
        let roots: Vec<&MaterialGroup> = all
            .iter()
            .filter(|m| m.is_root())
            .filter_map(|m| material_groups.get(&m.id))
            .collect();

        let guid_material_groups = build_guid_map(&roots);
        let fallback_materials = build_fallback_map(&roots, default_quality_diameter);
        let diameter_materials = build_diameter_map(&roots, default_quality_diameter);

        tracing::debug!(
            "Rebuilt material lookup: {} groups, {} GUIDs, {} fallback types",
            material_groups.len(),
            guid_material_groups.len(),
            fallback_materials.len()
        );

        Self {
            material_groups,
            fallback_materials,
            diameter_materials,
            guid_material_groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.material_groups.is_empty()
    }
}

fn build_groups(
    registry: &dyn ContainerRegistry,
    all: &[MaterialMetadata],
) -> BTreeMap<String, MaterialGroup> {
    let mut groups: BTreeMap<String, MaterialGroup> = all
        .iter()
        .filter(|m| m.is_root())
        .map(|m| {
            let group = MaterialGroup::new(
                m.id.clone(),
                MaterialNode::new(m.clone()),
                registry.is_read_only(&m.id),
            );
            (m.id.clone(), group)
        })
        .collect();

    let mut orphaned = HashSet::new();
    for metadata in all.iter().filter(|m| !m.is_root()) {
        match groups.get_mut(&metadata.base_file) {
            Some(group) => group
                .derived_material_node_list
                .push(MaterialNode::new(metadata.clone())),
            None => {
                if orphaned.insert(metadata.base_file.clone()) {
                    tracing::warn!(
                        "Material group {} has no root material, skipping it",
                        metadata.base_file
                    );
                }
            }
        }
    }

    groups
}

fn build_guid_map(roots: &[&MaterialGroup]) -> HashMap<String, Vec<MaterialGroup>> {
    let mut map: HashMap<String, Vec<MaterialGroup>> = HashMap::new();
    for group in roots {
        map.entry(group.root_material_node.guid().to_string())
            .or_default()
            .push((*group).clone());
    }
    for groups in map.values_mut() {
        // sort_by_key is stable
        groups.sort_by_key(|g| !g.is_read_only);
    }
    map
}

fn build_fallback_map(
    roots: &[&MaterialGroup],
    default_quality_diameter: u32,
) -> HashMap<String, MaterialMetadata> {
    let mut map: HashMap<String, MaterialMetadata> = HashMap::new();
    for group in roots {
        let metadata = &group.root_material_node.metadata;
        if map.contains_key(&metadata.material) {
            continue;
        }
        if metadata.brand.eq_ignore_ascii_case(GENERIC_BRAND)
            && metadata.approximate_diameter_mm() == default_quality_diameter
        {
            map.insert(metadata.material.clone(), metadata.clone());
        }
    }
    map
}

fn build_diameter_map(
    roots: &[&MaterialGroup],
    default_quality_diameter: u32,
) -> HashMap<String, String> {
    type VariantKey = (String, String, String, String);

    // Keys in first-seen order so "first inserted" is well defined.
    let mut key_order: Vec<VariantKey> = Vec::new();
    let mut by_key: HashMap<VariantKey, Vec<(u32, String)>> = HashMap::new();

    for group in roots {
        let metadata = &group.root_material_node.metadata;
        let key = (
            metadata.name.clone(),
            metadata.material.clone(),
            metadata.brand.clone(),
            metadata.color_name.clone(),
        );
        let diameter = metadata.approximate_diameter_mm();

        let entries = by_key.entry(key.clone()).or_insert_with(|| {
            key_order.push(key);
            Vec::new()
        });
        match entries.iter_mut().find(|(d, _)| *d == diameter) {
            Some(existing) => {
                if group.is_read_only {
                    existing.1 = metadata.id.clone();
                }
            }
            None => entries.push((diameter, metadata.id.clone())),
        }
    }

    let mut map = HashMap::new();
    for key in &key_order {
        let Some(entries) = by_key.get(key) else {
            continue;
        };
        let Some(default_id) = entries
            .iter()
            .find(|(d, _)| *d == default_quality_diameter)
            .or_else(|| entries.first())
            .map(|(_, id)| id.clone())
        else {
            continue;
        };
        for (_, id) in entries {
            map.insert(id.clone(), default_id.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;

    fn generic(id: &str, material: &str, diameter: f64) -> MaterialMetadata {
        MaterialMetadata::new(id, id)
            .with_material(material)
            .with_brand("Generic")
            .with_name(format!("Generic {}", material))
            .with_guid(format!("guid-{}", material.to_lowercase()))
            .with_approximate_diameter(diameter)
    }

    #[test]
    fn test_empty_registry() {
        let lookup = MaterialLookup::build(&InMemoryRegistry::new(), 3);
        assert!(lookup.is_empty());
        assert!(lookup.guid_material_groups.is_empty());
    }

    #[test]
    fn test_groups_and_orphans() {
        let registry = InMemoryRegistry::new();
        registry.add_material(generic("generic_pla", "PLA", 3.0)).unwrap();
        registry
            .add_material(MaterialMetadata::new("generic_pla_um3", "generic_pla"))
            .unwrap();
        registry
            .add_material(MaterialMetadata::new("orphan_um3", "orphan"))
            .unwrap();

        let lookup = MaterialLookup::build(&registry, 3);
        assert_eq!(lookup.material_groups.len(), 1);
        let group = &lookup.material_groups["generic_pla"];
        assert_eq!(group.derived_material_node_list.len(), 1);
        assert!(!lookup.material_groups.contains_key("orphan"));
    }

    #[test]
    fn test_guid_map_read_only_first() {
        let registry = InMemoryRegistry::new();
        let shared = |id: &str| generic(id, "PLA", 3.0).with_guid("shared");
        registry.add_material(shared("b_custom")).unwrap();
        registry.add_read_only_material(shared("a_builtin")).unwrap();
        registry.add_material(shared("c_custom")).unwrap();

        let lookup = MaterialLookup::build(&registry, 3);
        let names: Vec<&str> = lookup.guid_material_groups["shared"]
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["a_builtin", "b_custom", "c_custom"]);
    }

    #[test]
    fn test_fallback_requires_generic_default_diameter() {
        let registry = InMemoryRegistry::new();
        registry.add_material(generic("generic_pla_175", "PLA", 2.0)).unwrap();
        registry.add_material(generic("generic_pla", "PLA", 3.0)).unwrap();
        registry
            .add_material(
                MaterialMetadata::new("acme_abs", "acme_abs")
                    .with_material("ABS")
                    .with_brand("Acme"),
            )
            .unwrap();

        let lookup = MaterialLookup::build(&registry, 3);
        assert_eq!(lookup.fallback_materials["PLA"].id, "generic_pla");
        assert!(!lookup.fallback_materials.contains_key("ABS"));
    }

    #[test]
    fn test_diameter_map() {
        let registry = InMemoryRegistry::new();
        registry.add_material(generic("generic_pla_175", "PLA", 2.0)).unwrap();
        registry.add_material(generic("generic_pla", "PLA", 3.0)).unwrap();
        registry.add_material(generic("generic_abs_175", "ABS", 2.0)).unwrap();

        let lookup = MaterialLookup::build(&registry, 3);
        assert_eq!(lookup.diameter_materials["generic_pla_175"], "generic_pla");
        assert_eq!(lookup.diameter_materials["generic_pla"], "generic_pla");
        // No 3 mm flavour: the first inserted root stands in.
        assert_eq!(lookup.diameter_materials["generic_abs_175"], "generic_abs_175");
    }

    #[test]
    fn test_diameter_map_editable_does_not_overwrite() {
        let registry = InMemoryRegistry::new();
        registry.add_read_only_material(generic("generic_pla", "PLA", 3.0)).unwrap();
        registry.add_material(generic("my_pla_copy", "PLA", 3.0)).unwrap();

        let lookup = MaterialLookup::build(&registry, 3);
        assert_eq!(lookup.diameter_materials["generic_pla"], "generic_pla");
        assert!(!lookup.diameter_materials.contains_key("my_pla_copy"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let registry = InMemoryRegistry::new();
        registry.add_material(generic("generic_pla", "PLA", 3.0)).unwrap();
        registry.add_material(generic("generic_pla_175", "PLA", 2.0)).unwrap();

        assert_eq!(
            MaterialLookup::build(&registry, 3),
            MaterialLookup::build(&registry, 3)
        );
    }
}
