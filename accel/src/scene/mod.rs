//! Scene registration and packing.
//!
//! Models are queued with [`Scene::add_model`] and packed by
//! [`Scene::build_scene_data`] in two phases: every pending model is
//! registered (mesh and material dedup, BLAS build, one instance per model),
//! then the TLAS is rebuilt from scratch over the complete instance table.
//! Repeated builds append newly queued models and reproduce identical buffers
//! when nothing was queued.

use crate::{
    bvh::{Aabb, Tlas},
    error::SceneError,
    model::MeshModel,
    records::{PackedBlasNode, PackedInstance, PackedMaterial, PackedTlasNode, PackedVertexInfo},
};

pub mod geometry;
pub mod instances;
pub mod materials;

pub use geometry::{GeometryStore, MeshEntry};
pub use instances::{BlasInstance, InstanceTable};
pub use materials::{MaterialTable, TextureSlots};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneConfig {
    /// Generate flat face normals for meshes that come without normals.
    /// When unset, missing normals are packed as zeros.
    pub generate_missing_normals: bool,
}

/// Flat arrays ready for upload, one per storage buffer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SceneBuffers {
    /// Object-space vertex positions, 3 floats per vertex, 9 per triangle.
    pub vertices: Vec<f32>,
    pub vertex_info: Vec<PackedVertexInfo>,
    pub blas_nodes: Vec<PackedBlasNode>,
    /// Global triangle indices in BLAS leaf order.
    pub triangle_indices: Vec<u32>,
    pub instances: Vec<PackedInstance>,
    pub materials: Vec<PackedMaterial>,
    pub tlas_nodes: Vec<PackedTlasNode>,
    pub texture_slots: TextureSlots,
}

impl SceneBuffers {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_info_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertex_info)
    }

    pub fn blas_node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blas_nodes)
    }

    pub fn triangle_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangle_indices)
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn material_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    pub fn tlas_node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tlas_nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.vertex_bytes().len()
            + self.vertex_info_bytes().len()
            + self.blas_node_bytes().len()
            + self.triangle_index_bytes().len()
            + self.instance_bytes().len()
            + self.material_bytes().len()
            + self.tlas_node_bytes().len()
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    config: SceneConfig,
    pending: Vec<MeshModel>,
    geometry: GeometryStore,
    materials: MaterialTable,
    instances: InstanceTable,
    tlas: Tlas,
    buffers: SceneBuffers,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Queues a model for the next [`Scene::build_scene_data`]. The mesh is
    /// validated here so bad input never reaches the builders.
    pub fn add_model(&mut self, model: MeshModel) -> Result<(), SceneError> {
        model.mesh.validate()?;
        self.pending.push(model);
        Ok(())
    }

    pub fn build_scene_data(&mut self) -> &SceneBuffers {
        for model in std::mem::take(&mut self.pending) {
            let blas_offset = self
                .geometry
                .register(&model.mesh, self.config.generate_missing_normals);
            let material_index = self.materials.register(&model.material);
            self.instances
                .push(BlasInstance::new(model.transform, blas_offset, material_index));
        }

        let instance_bounds: Vec<Aabb> = self
            .instances
            .iter()
            .enumerate()
            .map(|(index, instance)| self.world_bounds(index, instance))
            .collect();
        self.tlas = Tlas::build(&instance_bounds);

        let (materials, texture_slots) = self.materials.pack();
        self.buffers = SceneBuffers {
            vertices: self.geometry.vertices().to_vec(),
            vertex_info: self.geometry.vertex_info().to_vec(),
            blas_nodes: self.geometry.pack_blas_nodes(),
            triangle_indices: self.geometry.pack_triangle_indices(),
            instances: self.instances.pack(),
            materials,
            tlas_nodes: self.tlas.used_nodes().iter().map(PackedTlasNode::from).collect(),
            texture_slots,
        };

        log::info!(
            "Packed scene: {} meshes, {} triangles, {} BLAS nodes, {} instances, {} materials, {} TLAS nodes, {} textures ({} bytes)",
            self.geometry.mesh_count(),
            self.geometry.triangle_count(),
            self.buffers.blas_nodes.len(),
            self.buffers.instances.len(),
            self.buffers.materials.len(),
            self.buffers.tlas_nodes.len(),
            self.buffers.texture_slots.layer_count(),
            self.buffers.total_bytes()
        );

        &self.buffers
    }

    fn world_bounds(&self, index: usize, instance: &BlasInstance) -> Aabb {
        let Some(bounds) = self.geometry.root_bounds_at(instance.blas_offset) else {
            panic!(
                "Instance {index} references BLAS offset {} but no mesh is registered there",
                instance.blas_offset
            );
        };
        bounds.transform(instance.transform)
    }

    /// Drops every registered and pending model so a new scene can be loaded.
    /// The configuration is kept.
    pub fn clear(&mut self) {
        *self = Self::with_config(self.config);
    }

    /// Buffers from the most recent [`Scene::build_scene_data`].
    pub fn buffers(&self) -> &SceneBuffers {
        &self.buffers
    }

    pub fn texture_slots(&self) -> &TextureSlots {
        &self.buffers.texture_slots
    }

    pub fn config(&self) -> SceneConfig {
        self.config
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    pub fn tlas(&self) -> &Tlas {
        &self.tlas
    }
}
