//! Acceleration-structure preprocessing for a compute path tracer.
//!
//! Meshes are deduplicated and each gets a bottom-level BVH (binned SAH),
//! placed instances are clustered into a top-level BVH, and everything is
//! packed into flat `bytemuck::Pod` arrays ready for storage buffers.

pub mod bvh;
pub mod error;
#[cfg(feature = "wgpu")]
pub mod gpu;
pub mod material;
pub mod mesh;
pub mod model;
pub mod records;
pub mod scene;
pub mod shapes;

pub use bvh::{Aabb, Blas, BlasNode, Tlas, TlasNode};
pub use error::{InvalidMeshReason, SceneError};
pub use material::{Material, MaterialId, TextureId, TextureSlot};
pub use mesh::{Mesh, MeshId};
pub use model::{MeshModel, Transform};
pub use scene::{Scene, SceneBuffers, SceneConfig, TextureSlots};
