use std::collections::HashMap;

use crate::{
    bvh::{Aabb, Blas},
    mesh::{FLOATS_PER_TRIANGLE, Mesh, MeshId},
    records::{PackedBlasNode, PackedVertexInfo},
};

/// Where one unique mesh landed in the shared arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshEntry {
    pub mesh_id: MeshId,
    pub blas_index: usize,
    /// Index of the mesh's BLAS root in the global node array.
    pub node_offset: u32,
    /// Index of the mesh's first triangle in the global triangle array.
    pub triangle_offset: u32,
    pub triangle_count: u32,
}

/// Deduplicated mesh data and per-mesh BLASes, in registration order.
#[derive(Debug, Default)]
pub struct GeometryStore {
    vertices: Vec<f32>,
    vertex_info: Vec<PackedVertexInfo>,
    blases: Vec<Blas>,
    entries: Vec<MeshEntry>,
    entry_by_mesh: HashMap<MeshId, usize>,
    mesh_by_node_offset: HashMap<u32, MeshId>,
    node_count: u32,
    triangle_count: u32,
}

impl GeometryStore {
    /// Registers `mesh` if its id is new and returns the node offset of its
    /// BLAS root. A repeated id returns the first registration's offset and
    /// leaves the store untouched.
    pub fn register(&mut self, mesh: &Mesh, generate_missing_normals: bool) -> u32 {
        if let Some(&index) = self.entry_by_mesh.get(&mesh.id) {
            return self.entries[index].node_offset;
        }

        let blas = Blas::build(&mesh.points);
        let entry = MeshEntry {
            mesh_id: mesh.id,
            blas_index: self.blases.len(),
            node_offset: self.node_count,
            triangle_offset: self.triangle_count,
            triangle_count: blas.triangle_count() as u32,
        };

        self.append_vertices(mesh, generate_missing_normals);
        self.node_count += blas.nodes.len() as u32;
        self.triangle_count += entry.triangle_count;

        self.entry_by_mesh.insert(mesh.id, self.entries.len());
        self.mesh_by_node_offset.insert(entry.node_offset, mesh.id);
        self.entries.push(entry);
        self.blases.push(blas);

        entry.node_offset
    }

    fn append_vertices(&mut self, mesh: &Mesh, generate_missing_normals: bool) {
        self.vertices.extend_from_slice(&mesh.points);

        let generated;
        let normals = match &mesh.normals {
            Some(normals) => Some(normals.as_slice()),
            None if generate_missing_normals => {
                generated = mesh.flat_normals();
                Some(generated.as_slice())
            }
            None => None,
        };

        for vertex in 0..mesh.vertex_count() {
            let normal = normals.map_or([0.0; 3], |normals| {
                [normals[vertex * 3], normals[vertex * 3 + 1], normals[vertex * 3 + 2]]
            });
            let uv = mesh
                .uvs
                .as_ref()
                .map_or([0.0; 2], |uvs| [uvs[vertex * 2], uvs[vertex * 2 + 1]]);
            self.vertex_info.push(PackedVertexInfo::new(normal, uv));
        }

        debug_assert_eq!(self.vertices.len() % FLOATS_PER_TRIANGLE, 0);
    }

    pub fn entry(&self, mesh_id: MeshId) -> Option<&MeshEntry> {
        self.entry_by_mesh.get(&mesh_id).map(|&index| &self.entries[index])
    }

    pub fn mesh_at_node_offset(&self, node_offset: u32) -> Option<MeshId> {
        self.mesh_by_node_offset.get(&node_offset).copied()
    }

    /// Object-space root bounds of the BLAS whose root sits at `node_offset`.
    pub fn root_bounds_at(&self, node_offset: u32) -> Option<Aabb> {
        let mesh_id = self.mesh_at_node_offset(node_offset)?;
        let entry = self.entry(mesh_id)?;
        self.blases[entry.blas_index].root_bounds()
    }

    pub fn entries(&self) -> &[MeshEntry] {
        &self.entries
    }

    pub fn blas(&self, mesh_id: MeshId) -> Option<&Blas> {
        self.entry(mesh_id).map(|entry| &self.blases[entry.blas_index])
    }

    pub fn mesh_count(&self) -> usize {
        self.entries.len()
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn vertex_info(&self) -> &[PackedVertexInfo] {
        &self.vertex_info
    }

    pub fn pack_blas_nodes(&self) -> Vec<PackedBlasNode> {
        let mut packed = Vec::with_capacity(self.node_count as usize);
        for entry in &self.entries {
            packed.extend(
                self.blases[entry.blas_index]
                    .nodes
                    .iter()
                    .map(|node| PackedBlasNode::from_node(node, entry.node_offset, entry.triangle_offset)),
            );
        }
        packed
    }

    pub fn pack_triangle_indices(&self) -> Vec<u32> {
        let mut packed = Vec::with_capacity(self.triangle_count as usize);
        for entry in &self.entries {
            packed.extend(
                self.blases[entry.blas_index]
                    .triangle_indices
                    .iter()
                    .map(|index| index + entry.triangle_offset),
            );
        }
        packed
    }
}
