use std::{collections::HashMap, sync::Arc};

use crate::{
    material::{Material, MaterialId, TextureId, TextureSlot},
    records::{NO_TEXTURE, PackedMaterial},
};

/// Materials deduplicated by id. Indices are stable for the table's lifetime.
#[derive(Debug, Default)]
pub struct MaterialTable {
    materials: Vec<Arc<Material>>,
    index_by_id: HashMap<MaterialId, u32>,
}

impl MaterialTable {
    /// Returns the index of `material`, appending it on first sight.
    pub fn register(&mut self, material: &Arc<Material>) -> u32 {
        if let Some(&index) = self.index_by_id.get(&material.id) {
            return index;
        }

        let index = self.materials.len() as u32;
        self.materials.push(Arc::clone(material));
        self.index_by_id.insert(material.id, index);
        index
    }

    pub fn index_of(&self, id: MaterialId) -> Option<u32> {
        self.index_by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    /// Resolves texture layers and packs every material in index order.
    pub fn pack(&self) -> (Vec<PackedMaterial>, TextureSlots) {
        let slots = TextureSlots::resolve(&self.materials);
        let packed = self
            .materials
            .iter()
            .map(|material| PackedMaterial::new(material, slots.slots_for(material)))
            .collect();
        (packed, slots)
    }
}

/// Texture-array layer assignment for the material maps.
///
/// Each distinct texture gets one layer, numbered in the order textures are
/// first seen while walking materials by index and slots in
/// [`TextureSlot::ALL`] order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextureSlots {
    layers: Vec<TextureId>,
    layer_by_texture: HashMap<TextureId, i32>,
    by_material: HashMap<MaterialId, [i32; 4]>,
}

impl TextureSlots {
    fn resolve(materials: &[Arc<Material>]) -> Self {
        let mut slots = Self::default();
        for material in materials {
            let mut layers = [NO_TEXTURE; 4];
            for slot in TextureSlot::ALL {
                if let Some(texture) = material.map(slot) {
                    layers[slot as usize] = slots.layer_or_insert(texture);
                }
            }
            slots.by_material.insert(material.id, layers);
        }
        slots
    }

    fn layer_or_insert(&mut self, texture: TextureId) -> i32 {
        if let Some(&layer) = self.layer_by_texture.get(&texture) {
            return layer;
        }

        let layer = self.layers.len() as i32;
        self.layers.push(texture);
        self.layer_by_texture.insert(texture, layer);
        layer
    }

    fn slots_for(&self, material: &Material) -> [i32; 4] {
        self.by_material
            .get(&material.id)
            .copied()
            .unwrap_or([NO_TEXTURE; 4])
    }

    /// Layer per [`TextureSlot`] for a material, `-1` where no map is bound.
    pub fn material_slots(&self, id: MaterialId) -> Option<[i32; 4]> {
        self.by_material.get(&id).copied()
    }

    pub fn layer(&self, texture: TextureId) -> Option<i32> {
        self.layer_by_texture.get(&texture).copied()
    }

    /// Textures in layer order, for the texture-array uploader.
    pub fn layers(&self) -> &[TextureId] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
