//! Favorite materials
//!
//! A set of root material ids, persisted as one `;`-joined preference
//! value in sorted order. Ids are not checked against the registry, so the
//! set may name materials that no longer exist.

use std::collections::BTreeSet;

pub const FAVORITES_SEPARATOR: char = ';';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: BTreeSet<String>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored preference value; empty segments are ignored
    pub fn parse(value: &str) -> Self {
        Self {
            ids: value
                .split(FAVORITES_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Preference value for the current set
    pub fn join(&self) -> String {
        self.ids
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&FAVORITES_SEPARATOR.to_string())
    }

    /// Returns `false` if the id was already present
    pub fn insert(&mut self, root_material_id: &str) -> bool {
        self.ids.insert(root_material_id.to_string())
    }

    /// Returns `false` if the id was not present
    pub fn remove(&mut self, root_material_id: &str) -> bool {
        self.ids.remove(root_material_id)
    }

    pub fn contains(&self, root_material_id: &str) -> bool {
        self.ids.contains(root_material_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}
