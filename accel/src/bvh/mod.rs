use maths::{Mat4, Vec3};

pub mod blas;
pub mod tlas;

pub use blas::{BINS, Blas, BlasNode};
pub use tlas::{Tlas, TlasNode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any `grow` call replaces.
    pub const fn empty() -> Self {
        Self {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn grow(&mut self, point: Vec3) {
        self.min = Vec3::min(self.min, point);
        self.max = Vec3::max(self.max, point);
    }

    pub fn grow_with(&mut self, bounds: &Aabb) {
        self.min = Vec3::min(self.min, bounds.min);
        self.max = Vec3::max(self.max, bounds.max);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut bounds = *self;
        bounds.grow_with(other);
        bounds
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the true surface area (`xy + yz + zx`); the factor of two cancels
    /// in every cost comparison. Empty boxes have zero area.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }

        let e = self.extent();
        e.x * e.y + e.y * e.z + e.z * e.x
    }

    pub fn contains_point(&self, point: Vec3, epsilon: f32) -> bool {
        (0..3).all(|axis| {
            point.axis(axis) >= self.min.axis(axis) - epsilon
                && point.axis(axis) <= self.max.axis(axis) + epsilon
        })
    }

    pub fn contains(&self, other: &Aabb, epsilon: f32) -> bool {
        self.contains_point(other.min, epsilon) && self.contains_point(other.max, epsilon)
    }

    /// Bounds of all eight transformed corners, so rotations grow the box.
    pub fn transform(&self, matrix: Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        let mut bounds = Aabb::empty();
        for corner in 0..8 {
            let point = Vec3::new(
                if corner & 1 == 0 { self.min.x } else { self.max.x },
                if corner & 2 == 0 { self.min.y } else { self.max.y },
                if corner & 4 == 0 { self.min.z } else { self.max.z },
            );
            bounds.grow(matrix.transform_point3(point));
        }
        bounds
    }
}
