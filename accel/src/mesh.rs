use maths::Vec3;

use crate::error::{InvalidMeshReason, SceneError};

pub type MeshId = u32;

/// Floats per triangle in `points` and `normals` (3 vertices of xyz).
pub const FLOATS_PER_TRIANGLE: usize = 9;
pub const UV_FLOATS_PER_TRIANGLE: usize = 6;

/// Non-indexed triangle soup. Each triangle owns its three vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub id: MeshId,
    pub points: Vec<f32>,
    pub normals: Option<Vec<f32>>,
    pub uvs: Option<Vec<f32>>,
}

impl Mesh {
    pub fn new(id: MeshId, points: Vec<f32>) -> Self {
        Self {
            id,
            points,
            normals: None,
            uvs: None,
        }
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<f32>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.points.len() / FLOATS_PER_TRIANGLE
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len() / 3
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason| SceneError::InvalidMesh {
            mesh_id: self.id,
            reason,
        };

        if self.points.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(invalid(InvalidMeshReason::PointsNotTriangles {
                len: self.points.len(),
            }));
        }
        if self.points.is_empty() {
            return Err(invalid(InvalidMeshReason::Empty));
        }
        if let Some(normals) = &self.normals {
            if normals.len() != self.points.len() {
                return Err(invalid(InvalidMeshReason::NormalsLength {
                    expected: self.points.len(),
                    actual: normals.len(),
                }));
            }
        }
        if let Some(uvs) = &self.uvs {
            let expected = self.triangle_count() * UV_FLOATS_PER_TRIANGLE;
            if uvs.len() != expected {
                return Err(invalid(InvalidMeshReason::UvsLength {
                    expected,
                    actual: uvs.len(),
                }));
            }
        }

        Ok(())
    }

    pub fn vertex(&self, triangle: usize, corner: usize) -> Vec3 {
        Vec3::from_slice(&self.points, triangle * FLOATS_PER_TRIANGLE + corner * 3)
    }

    /// One face normal per vertex, `normalize((v1 - v0) x (v2 - v0))`.
    pub fn flat_normals(&self) -> Vec<f32> {
        let mut normals = Vec::with_capacity(self.points.len());
        for triangle in 0..self.triangle_count() {
            let v0 = self.vertex(triangle, 0);
            let v1 = self.vertex(triangle, 1);
            let v2 = self.vertex(triangle, 2);
            let normal = (v1 - v0).cross(v2 - v0).normalized();
            for _ in 0..3 {
                normals.extend_from_slice(&normal.to_array());
            }
        }
        normals
    }
}
