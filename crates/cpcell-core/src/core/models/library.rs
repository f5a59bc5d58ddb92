use super::ids::MaterialId;
use super::material::Material;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Caller-owned storage for material records.
///
/// Cells never own materials; they borrow the library and refer to its records through
/// [`MaterialId`] keys, so one record can be bound to many regions and many cells.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    /// Primary storage for materials using a slot map for stable IDs.
    materials: SlotMap<MaterialId, Material>,
    /// Lookup map for materials registered under a name.
    name_map: HashMap<String, MaterialId>,
}

impl MaterialLibrary {
    /// Creates a new, empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an anonymous material and returns its ID.
    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    /// Stores a material under `name`.
    ///
    /// If the name is already taken, the new record replaces the association (the old
    /// record stays in the library under its original ID).
    ///
    /// # Arguments
    ///
    /// * `name` - The name to register the material under.
    /// * `material` - The material record.
    ///
    /// # Return
    ///
    /// The ID of the newly stored material.
    pub fn add_named(&mut self, name: &str, material: Material) -> MaterialId {
        let id = self.materials.insert(material);
        self.name_map.insert(name.to_string(), id);
        id
    }

    /// Retrieves a material by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&Material)` if the ID is live in this library, otherwise `None`.
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Finds a material ID by the name it was registered under.
    pub fn find_by_name(&self, name: &str) -> Option<MaterialId> {
        self.name_map.get(name).copied()
    }

    /// Returns the name `id` is currently registered under, if any.
    pub fn name_of(&self, id: MaterialId) -> Option<&str> {
        self.name_map
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(name, _)| name.as_str())
    }

    /// Removes a material from the library, returning it if it was present.
    ///
    /// Cells borrowing the library prevent this while they are alive.
    pub fn remove(&mut self, id: MaterialId) -> Option<Material> {
        self.name_map.retain(|_, v| *v != id);
        self.materials.remove(id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter()
    }
}
