use maths::Vec3;

pub type MaterialId = u32;

/// Opaque handle to a texture owned by the caller's texture loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// The four texture maps a material may reference, in packed slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Albedo = 0,
    Emissive = 1,
    Roughness = 2,
    Metallic = 3,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Albedo,
        TextureSlot::Emissive,
        TextureSlot::Roughness,
        TextureSlot::Metallic,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub base_color: Vec3,
    pub emissive_color: Vec3,
    pub roughness: f32,
    pub metallic: f32,
    pub albedo_map: Option<TextureId>,
    pub emissive_map: Option<TextureId>,
    pub roughness_map: Option<TextureId>,
    pub metallic_map: Option<TextureId>,
}

impl Material {
    /// White, non-emissive, fully rough dielectric.
    pub fn new(id: MaterialId) -> Self {
        Self {
            id,
            base_color: Vec3::ONE,
            emissive_color: Vec3::ZERO,
            roughness: 1.0,
            metallic: 0.0,
            albedo_map: None,
            emissive_map: None,
            roughness_map: None,
            metallic_map: None,
        }
    }

    pub fn with_base_color(mut self, base_color: Vec3) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_emissive_color(mut self, emissive_color: Vec3) -> Self {
        self.emissive_color = emissive_color;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_map(mut self, slot: TextureSlot, texture: TextureId) -> Self {
        match slot {
            TextureSlot::Albedo => self.albedo_map = Some(texture),
            TextureSlot::Emissive => self.emissive_map = Some(texture),
            TextureSlot::Roughness => self.roughness_map = Some(texture),
            TextureSlot::Metallic => self.metallic_map = Some(texture),
        }
        self
    }

    pub fn map(&self, slot: TextureSlot) -> Option<TextureId> {
        match slot {
            TextureSlot::Albedo => self.albedo_map,
            TextureSlot::Emissive => self.emissive_map,
            TextureSlot::Roughness => self.roughness_map,
            TextureSlot::Metallic => self.metallic_map,
        }
    }
}
