//! Fixed-size records the traversal kernel reads from storage buffers.
//!
//! Every record is `#[repr(C)]` with explicit padding so vec3 fields start on
//! 16-byte boundaries, matching WGSL storage layout rules.

use std::mem::size_of;

use maths::{Mat4, Vec3};

use crate::{
    bvh::{Aabb, BlasNode, TlasNode},
    material::{Material, TextureSlot},
};

/// Texture slot value meaning "no texture bound".
pub const NO_TEXTURE: i32 = -1;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedBlasNode {
    pub left_first: u32,
    pub triangle_count: u32,
    pub _padding: [u32; 2],
    pub aabb_min: [f32; 4],
    pub aabb_max: [f32; 4],
}

impl PackedBlasNode {
    /// `left_first` is rebased onto the global arrays: interior nodes by the
    /// mesh's node offset, leaves by its triangle offset.
    pub fn from_node(node: &BlasNode, node_offset: u32, triangle_offset: u32) -> Self {
        let left_first = if node.is_leaf() {
            node.left_first + triangle_offset
        } else {
            node.left_first + node_offset
        };

        Self {
            left_first,
            triangle_count: node.triangle_count,
            _padding: [0; 2],
            aabb_min: padded(node.bounds.min.to_array()),
            aabb_max: padded(node.bounds.max.to_array()),
        }
    }

    pub fn bounds(&self) -> Aabb {
        unpadded_bounds(self.aabb_min, self.aabb_max)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedInstance {
    pub transform: [[f32; 4]; 4],
    pub transform_inv: [[f32; 4]; 4],
    pub blas_offset: u32,
    pub material_index: u32,
    pub _padding: [u32; 2],
}

impl PackedInstance {
    pub fn new(transform: Mat4, transform_inv: Mat4, blas_offset: u32, material_index: u32) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            transform_inv: transform_inv.to_cols_array_2d(),
            blas_offset,
            material_index,
            _padding: [0; 2],
        }
    }
}

impl Default for PackedInstance {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, 0, 0)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedMaterial {
    pub base_color: [f32; 3],
    pub roughness: f32,
    pub emissive_color: [f32; 3],
    pub metallic: f32,
    /// Texture-array layers in [`TextureSlot`] order, [`NO_TEXTURE`] when absent.
    pub texture_slots: [i32; 4],
}

impl PackedMaterial {
    pub fn new(material: &Material, texture_slots: [i32; 4]) -> Self {
        Self {
            base_color: material.base_color.to_array(),
            roughness: material.roughness,
            emissive_color: material.emissive_color.to_array(),
            metallic: material.metallic,
            texture_slots,
        }
    }

    pub fn slot(&self, slot: TextureSlot) -> i32 {
        self.texture_slots[slot as usize]
    }
}

impl Default for PackedMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0; 3],
            roughness: 1.0,
            emissive_color: [0.0; 3],
            metallic: 0.0,
            texture_slots: [NO_TEXTURE; 4],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedTlasNode {
    pub aabb_min: [f32; 4],
    pub aabb_max: [f32; 4],
    pub left: u32,
    pub right: u32,
    pub blas: u32,
    pub _padding: u32,
}

impl PackedTlasNode {
    pub fn is_leaf(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    pub fn bounds(&self) -> Aabb {
        unpadded_bounds(self.aabb_min, self.aabb_max)
    }
}

impl From<&TlasNode> for PackedTlasNode {
    fn from(node: &TlasNode) -> Self {
        Self {
            aabb_min: padded(node.bounds.min.to_array()),
            aabb_max: padded(node.bounds.max.to_array()),
            left: node.left,
            right: node.right,
            blas: node.blas,
            _padding: 0,
        }
    }
}

/// Shading attributes for one vertex, parallel to the vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertexInfo {
    pub normal: [f32; 4],
    pub uv: [f32; 4],
}

impl PackedVertexInfo {
    pub fn new(normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            normal: padded(normal),
            uv: [uv[0], uv[1], 0.0, 0.0],
        }
    }
}

pub const BLAS_NODE_BYTE_SIZE: usize = size_of::<PackedBlasNode>();
pub const INSTANCE_BYTE_SIZE: usize = size_of::<PackedInstance>();
pub const MATERIAL_BYTE_SIZE: usize = size_of::<PackedMaterial>();
pub const TLAS_NODE_BYTE_SIZE: usize = size_of::<PackedTlasNode>();
pub const VERTEX_INFO_BYTE_SIZE: usize = size_of::<PackedVertexInfo>();

const _: () = assert!(BLAS_NODE_BYTE_SIZE == 12 * 4);
const _: () = assert!(INSTANCE_BYTE_SIZE == 2 * 64 + 16);
const _: () = assert!(INSTANCE_BYTE_SIZE % 16 == 0);
const _: () = assert!(MATERIAL_BYTE_SIZE == 48);
const _: () = assert!(TLAS_NODE_BYTE_SIZE == 48);
const _: () = assert!(VERTEX_INFO_BYTE_SIZE == 32);

fn padded(vec: [f32; 3]) -> [f32; 4] {
    [vec[0], vec[1], vec[2], 0.0]
}

fn unpadded_bounds(min: [f32; 4], max: [f32; 4]) -> Aabb {
    Aabb::new(
        Vec3::new(min[0], min[1], min[2]),
        Vec3::new(max[0], max[1], max[2]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blas_node_word_layout() {
        let node = BlasNode {
            left_first: 3,
            triangle_count: 2,
            bounds: Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)),
        };
        let packed = PackedBlasNode::from_node(&node, 100, 10);
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&packed));

        assert_eq!(words.len(), 12);
        assert_eq!(&words[0..4], &[13, 2, 0, 0]);
        assert_eq!(f32::from_bits(words[4]), 1.0);
        assert_eq!(f32::from_bits(words[10]), 6.0);
        assert_eq!(words[11], 0);
    }

    #[test]
    fn test_interior_node_rebased_by_node_offset() {
        let node = BlasNode {
            left_first: 1,
            triangle_count: 0,
            bounds: Aabb::new(Vec3::ZERO, Vec3::ONE),
        };
        assert_eq!(PackedBlasNode::from_node(&node, 100, 10).left_first, 101);
    }

    #[test]
    fn test_instance_layout() {
        let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let packed = PackedInstance::new(transform, transform.inverse(), 7, 2);
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&packed));

        assert_eq!(words.len(), 36);
        assert_eq!(f32::from_bits(words[12]), 1.0);
        assert_eq!(f32::from_bits(words[16 + 12]), -1.0);
        assert_eq!(&words[32..36], &[7, 2, 0, 0]);
    }

    #[test]
    fn test_default_material_has_no_textures() {
        let packed = PackedMaterial::default();
        for slot in TextureSlot::ALL {
            assert_eq!(packed.slot(slot), NO_TEXTURE);
        }
    }

    #[test]
    fn test_tlas_node_round_trips_bounds() {
        let node = TlasNode {
            bounds: Aabb::new(Vec3::splat(-1.0), Vec3::splat(2.0)),
            left: 4,
            right: 5,
            blas: 0,
        };
        let packed = PackedTlasNode::from(&node);
        assert_eq!(packed.bounds(), node.bounds);
        assert!(!packed.is_leaf());
        assert_eq!((packed.left, packed.right, packed.blas), (4, 5, 0));
    }
}
