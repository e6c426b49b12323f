use crate::mesh::MeshId;

/// Why a mesh was rejected at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidMeshReason {
    /// `points` does not hold a whole number of triangles (9 floats each).
    PointsNotTriangles { len: usize },
    /// The mesh has no triangles at all.
    Empty,
    NormalsLength { expected: usize, actual: usize },
    UvsLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    InvalidMesh {
        mesh_id: MeshId,
        reason: InvalidMeshReason,
    },
}

impl std::fmt::Display for InvalidMeshReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidMeshReason::PointsNotTriangles { len } => {
                write!(f, "{len} point floats is not a multiple of 9")
            }
            InvalidMeshReason::Empty => write!(f, "mesh has no triangles"),
            InvalidMeshReason::NormalsLength { expected, actual } => {
                write!(f, "expected {expected} normal floats, found {actual}")
            }
            InvalidMeshReason::UvsLength { expected, actual } => {
                write!(f, "expected {expected} uv floats, found {actual}")
            }
        }
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::InvalidMesh { mesh_id, reason } => {
                write!(f, "Invalid mesh {mesh_id}: {reason}")
            }
        }
    }
}

impl std::error::Error for SceneError {}
