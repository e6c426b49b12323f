use maths::Vec3;

use crate::mesh::{Mesh, MeshId};

/// Corners of a unit face in (s, t) space, two counter-clockwise triangles.
const FACE_CORNERS: [(f32, f32); 6] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
];

#[derive(Default)]
struct MeshData {
    points: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
}

impl MeshData {
    /// Unit square centred on `center`, spanned by `u` and `v`. The face
    /// normal is `u x v`.
    fn push_face(&mut self, center: Vec3, u: Vec3, v: Vec3) {
        let normal = u.cross(v);
        for (s, t) in FACE_CORNERS {
            let point = center + u * (s - 0.5) + v * (t - 0.5);
            self.points.extend_from_slice(&point.to_array());
            self.normals.extend_from_slice(&normal.to_array());
            self.uvs.extend_from_slice(&[s, t]);
        }
    }

    fn into_mesh(self, id: MeshId) -> Mesh {
        Mesh::new(id, self.points)
            .with_normals(self.normals)
            .with_uvs(self.uvs)
    }
}

/// A single right triangle in the XY plane with no normals or uvs.
pub fn triangle(id: MeshId) -> Mesh {
    Mesh::new(id, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
}

/// Unit quad in the XY plane centred on the origin, facing +Z.
pub fn quad(id: MeshId) -> Mesh {
    let mut data = MeshData::default();
    data.push_face(Vec3::ZERO, Vec3::X, Vec3::Y);
    data.into_mesh(id)
}

/// Unit cube centred on the origin with outward-facing triangles.
pub fn cube(id: MeshId) -> Mesh {
    let mut data = MeshData::default();
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::Y, Vec3::X),
    ];
    for (normal, u, v) in faces {
        data.push_face(normal * 0.5, u, v);
    }
    data.into_mesh(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Blas;

    #[test]
    fn test_cube_is_valid_and_closed() {
        let cube = cube(0);
        assert_eq!(cube.validate(), Ok(()));
        assert_eq!(cube.triangle_count(), 12);

        let bounds = Blas::build(&cube.points).root_bounds().unwrap();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::splat(0.5));
    }

    #[test]
    fn test_cube_normals_match_winding() {
        let cube = cube(0);
        let given = cube.normals.clone().unwrap();
        let flat = cube.flat_normals();
        for (a, b) in given.iter().zip(&flat) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = cube(0);
        let normals = cube.normals.as_ref().unwrap();
        for vertex in 0..cube.vertex_count() {
            let point = Vec3::from_slice(&cube.points, vertex * 3);
            let normal = Vec3::from_slice(normals, vertex * 3);
            assert!(point.dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let quad = quad(1);
        assert_eq!(quad.validate(), Ok(()));
        assert_eq!(quad.triangle_count(), 2);
        assert_eq!(&quad.normals.as_ref().unwrap()[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&quad.uvs.as_ref().unwrap()[2..4], &[1.0, 0.0]);
    }
}
