use std::collections::BTreeMap;
use std::sync::Arc;

use image::RgbaImage;
use slotmap::SlotMap;

slotmap::new_key_type! {
    pub struct MaterialId;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MaterialValue {
    Scalar(f32),
    Vec4([f32; 4]),
}

/// Image bound to a named material slot.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    /// Cache key of the source, e.g. "procedural".
    pub key: String,
    pub image: Arc<RgbaImage>,
    /// Bumped every time the slot is rebound.
    pub generation: u64,
}

/// Named parameters and texture slots, optionally inheriting from a parent.
///
/// Every mutation marks the material dirty; `MaterialSet::commit` clears the
/// flag once the scene backend has consumed the change.
#[derive(Debug, Clone, Default)]
pub struct Material {
    name: String,
    parent: Option<MaterialId>,
    params: BTreeMap<String, MaterialValue>,
    textures: BTreeMap<String, TextureSlot>,
    dirty: bool,
}

impl Material {
    pub fn new(name: impl Into<String>, parent: Option<MaterialId>) -> Self {
        Self {
            name: name.into(),
            parent,
            dirty: true,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<MaterialId> {
        self.parent
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_scalar(&mut self, name: &str, value: f32) {
        self.params.insert(name.to_string(), MaterialValue::Scalar(value));
        self.dirty = true;
    }

    pub fn set_vec4(&mut self, name: &str, value: [f32; 4]) {
        self.params.insert(name.to_string(), MaterialValue::Vec4(value));
        self.dirty = true;
    }

    /// Own parameter only; see `MaterialSet::resolve_param` for inheritance.
    pub fn param(&self, name: &str) -> Option<MaterialValue> {
        self.params.get(name).copied()
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, MaterialValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Binds `image` to `slot` and returns the new slot generation.
    pub fn set_texture(&mut self, slot: &str, key: &str, image: Arc<RgbaImage>) -> u64 {
        let generation = self.textures.get(slot).map_or(0, |s| s.generation + 1);
        self.textures.insert(
            slot.to_string(),
            TextureSlot {
                key: key.to_string(),
                image,
                generation,
            },
        );
        self.dirty = true;
        generation
    }

    pub fn texture(&self, slot: &str) -> Option<&TextureSlot> {
        self.textures.get(slot)
    }

    pub fn textures(&self) -> impl Iterator<Item = (&str, &TextureSlot)> {
        self.textures.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Default)]
pub struct MaterialSet {
    materials: SlotMap<MaterialId, Material>,
}

impl MaterialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
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

    /// Looks `name` up on `id`, then along its parent chain.
    pub fn resolve_param(&self, id: MaterialId, name: &str) -> Option<MaterialValue> {
        let mut cursor = Some(id);
        // Bounded by the set size so a malformed parent loop cannot spin.
        for _ in 0..=self.materials.len() {
            let material = self.materials.get(cursor?)?;
            if let Some(value) = material.param(name) {
                return Some(value);
            }
            cursor = material.parent;
        }
        None
    }

    pub fn dirty(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.materials
            .iter()
            .filter(|(_, m)| m.dirty)
            .map(|(id, _)| id)
    }

    /// Clears every dirty flag and returns the ids that were dirty.
    pub fn commit(&mut self) -> Vec<MaterialId> {
        let mut committed = Vec::new();
        for (id, material) in self.materials.iter_mut() {
            if material.dirty {
                material.dirty = false;
                committed.push(id);
            }
        }
        committed
    }

    pub fn clear(&mut self) {
        self.materials.clear();
    }
}
