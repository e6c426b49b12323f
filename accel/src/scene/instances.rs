use maths::Mat4;

use crate::records::PackedInstance;

/// One placement of a mesh: its world transform, the BLAS it traverses and the
/// material it shades with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlasInstance {
    pub transform: Mat4,
    pub transform_inv: Mat4,
    /// Global node index of the mesh's BLAS root.
    pub blas_offset: u32,
    pub material_index: u32,
}

impl BlasInstance {
    pub fn new(transform: Mat4, blas_offset: u32, material_index: u32) -> Self {
        let transform_inv = transform.try_inverse().unwrap_or_else(|| {
            log::warn!(
                "Instance of BLAS {blas_offset} has a singular transform, using identity inverse"
            );
            Mat4::IDENTITY
        });

        Self {
            transform,
            transform_inv,
            blas_offset,
            material_index,
        }
    }

    pub fn pack(&self) -> PackedInstance {
        PackedInstance::new(
            self.transform,
            self.transform_inv,
            self.blas_offset,
            self.material_index,
        )
    }
}

/// Append-only list of instances; an instance's index is its TLAS leaf `blas` value.
#[derive(Debug, Default)]
pub struct InstanceTable {
    instances: Vec<BlasInstance>,
}

impl InstanceTable {
    pub fn push(&mut self, instance: BlasInstance) -> u32 {
        self.instances.push(instance);
        (self.instances.len() - 1) as u32
    }

    pub fn get(&self, index: usize) -> Option<&BlasInstance> {
        self.instances.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlasInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn pack(&self) -> Vec<PackedInstance> {
        self.instances.iter().map(BlasInstance::pack).collect()
    }
}

#[cfg(test)]
mod tests {
    use maths::Vec3;

    use super::*;

    #[test]
    fn test_instance_stores_inverse() {
        let transform = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let instance = BlasInstance::new(transform, 12, 1);

        let point = Vec3::new(1.0, 1.0, 1.0);
        let round_trip = instance
            .transform_inv
            .transform_point3(instance.transform.transform_point3(point));
        assert!((round_trip - point).length() < 1e-5);
    }

    #[test]
    fn test_singular_transform_falls_back_to_identity() {
        let flatten = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        let instance = BlasInstance::new(flatten, 0, 0);
        assert_eq!(instance.transform_inv, Mat4::IDENTITY);
    }

    #[test]
    fn test_push_returns_instance_index() {
        let mut table = InstanceTable::default();
        assert_eq!(table.push(BlasInstance::new(Mat4::IDENTITY, 0, 0)), 0);
        assert_eq!(table.push(BlasInstance::new(Mat4::IDENTITY, 3, 1)), 1);

        let packed = table.pack();
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[1].blas_offset, 3);
        assert_eq!(packed[1].material_index, 1);
    }
}
