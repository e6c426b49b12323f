use maths::Vec3;

use super::Aabb;
use crate::mesh::FLOATS_PER_TRIANGLE;

/// Candidate split planes per axis are the boundaries between these bins.
pub const BINS: usize = 10;

/// `triangle_count > 0` marks a leaf whose triangles are
/// `triangle_indices[left_first..left_first + triangle_count]`; otherwise the
/// node is interior and its children are `left_first` and `left_first + 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlasNode {
    pub left_first: u32,
    pub triangle_count: u32,
    pub bounds: Aabb,
}

impl BlasNode {
    pub fn is_leaf(&self) -> bool {
        self.triangle_count > 0
    }
}

/// Object-space BVH over one mesh's triangles.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Blas {
    pub nodes: Vec<BlasNode>,
    /// Permutation of `0..triangle_count` grouped so every leaf owns a contiguous range.
    pub triangle_indices: Vec<u32>,
}

impl Blas {
    pub fn build(points: &[f32]) -> Self {
        debug_assert_eq!(points.len() % FLOATS_PER_TRIANGLE, 0);
        if points.len() < FLOATS_PER_TRIANGLE {
            return Self::default();
        }

        let blas = BlasBuilder::new(points).build();
        log::debug!(
            "Built BLAS over {} triangles with {} nodes",
            blas.triangle_indices.len(),
            blas.nodes.len()
        );
        blas
    }

    pub fn root_bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|node| node.bounds)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Bin {
    bounds: Aabb,
    count: u32,
}

/// Best plane found by the binned search.
#[derive(Clone, Copy, Debug)]
struct Split {
    axis: usize,
    /// Triangles whose centroid lands in bins `0..=bin` go left.
    bin: usize,
    centroid_min: f32,
    bin_scale: f32,
    cost: f32,
}

impl Split {
    fn bin_of(&self, centroid: Vec3) -> usize {
        bin_index(centroid.axis(self.axis), self.centroid_min, self.bin_scale)
    }
}

fn bin_index(value: f32, min: f32, scale: f32) -> usize {
    (((value - min) * scale) as usize).min(BINS - 1)
}

struct BlasBuilder {
    centroids: Vec<Vec3>,
    triangle_bounds: Vec<Aabb>,
    triangle_indices: Vec<u32>,
    nodes: Vec<BlasNode>,
    nodes_used: usize,
}

impl BlasBuilder {
    fn new(points: &[f32]) -> Self {
        let triangle_count = points.len() / FLOATS_PER_TRIANGLE;
        let mut centroids = Vec::with_capacity(triangle_count);
        let mut triangle_bounds = Vec::with_capacity(triangle_count);

        for triangle in 0..triangle_count {
            let base = triangle * FLOATS_PER_TRIANGLE;
            let v0 = Vec3::from_slice(points, base);
            let v1 = Vec3::from_slice(points, base + 3);
            let v2 = Vec3::from_slice(points, base + 6);

            let mut bounds = Aabb::empty();
            bounds.grow(v0);
            bounds.grow(v1);
            bounds.grow(v2);

            centroids.push((v0 + v1 + v2) / 3.0);
            triangle_bounds.push(bounds);
        }

        // A binary tree with one triangle per leaf has 2N - 1 nodes at most.
        let node_capacity = 2 * triangle_count - 1;

        Self {
            centroids,
            triangle_bounds,
            triangle_indices: (0..triangle_count as u32).collect(),
            nodes: vec![BlasNode::default(); node_capacity],
            nodes_used: 1,
        }
    }

    fn build(mut self) -> Blas {
        self.nodes[0] = BlasNode {
            left_first: 0,
            triangle_count: self.triangle_indices.len() as u32,
            bounds: Aabb::empty(),
        };
        self.update_bounds(0);
        self.subdivide(0);

        self.nodes.truncate(self.nodes_used);

        Blas {
            nodes: self.nodes,
            triangle_indices: self.triangle_indices,
        }
    }

    fn triangles(&self, node: &BlasNode) -> &[u32] {
        let first = node.left_first as usize;
        &self.triangle_indices[first..first + node.triangle_count as usize]
    }

    /// Node bounds cover the triangles' vertices, not just their centroids.
    fn update_bounds(&mut self, node_index: usize) {
        let node = self.nodes[node_index];
        let mut bounds = Aabb::empty();
        for &triangle in self.triangles(&node) {
            bounds.grow_with(&self.triangle_bounds[triangle as usize]);
        }
        self.nodes[node_index].bounds = bounds;
    }

    fn subdivide(&mut self, node_index: usize) {
        let node = self.nodes[node_index];

        let Some(split) = self.find_best_split(&node) else {
            return;
        };
        let leaf_cost = node.bounds.surface_area() * node.triangle_count as f32;
        if split.cost >= leaf_cost {
            return;
        }

        // Single Hoare-style pass: left side grows from the front, right side from the back.
        let first = node.left_first as usize;
        let mut i = first;
        let mut j = first + node.triangle_count as usize;
        while i < j {
            let centroid = self.centroids[self.triangle_indices[i] as usize];
            // The split plane is the upper edge of bin `split.bin`.
            if split.bin_of(centroid) <= split.bin {
                i += 1;
            } else {
                j -= 1;
                self.triangle_indices.swap(i, j);
            }
        }

        let left_count = (i - first) as u32;
        if left_count == 0 || left_count == node.triangle_count {
            return;
        }

        let left_child = self.nodes_used;
        let right_child = left_child + 1;
        self.nodes_used += 2;

        self.nodes[left_child] = BlasNode {
            left_first: node.left_first,
            triangle_count: left_count,
            bounds: Aabb::empty(),
        };
        self.nodes[right_child] = BlasNode {
            left_first: i as u32,
            triangle_count: node.triangle_count - left_count,
            bounds: Aabb::empty(),
        };
        self.nodes[node_index].left_first = left_child as u32;
        self.nodes[node_index].triangle_count = 0;

        self.update_bounds(left_child);
        self.update_bounds(right_child);
        self.subdivide(left_child);
        self.subdivide(right_child);
    }

    /// Lowest-cost plane over all axes and bin boundaries. Ties keep the first
    /// one found (lowest axis, then lowest boundary).
    fn find_best_split(&self, node: &BlasNode) -> Option<Split> {
        let triangles = self.triangles(node);
        let mut best: Option<Split> = None;

        for axis in 0..3 {
            let mut centroid_min = f32::INFINITY;
            let mut centroid_max = f32::NEG_INFINITY;
            for &triangle in triangles {
                let value = self.centroids[triangle as usize].axis(axis);
                centroid_min = centroid_min.min(value);
                centroid_max = centroid_max.max(value);
            }
            if centroid_min == centroid_max {
                continue;
            }

            let bin_scale = BINS as f32 / (centroid_max - centroid_min);
            let mut bins = [Bin::default(); BINS];
            for &triangle in triangles {
                let value = self.centroids[triangle as usize].axis(axis);
                let bin = &mut bins[bin_index(value, centroid_min, bin_scale)];
                bin.count += 1;
                bin.bounds.grow_with(&self.triangle_bounds[triangle as usize]);
            }

            let mut left_area = [0.0; BINS - 1];
            let mut left_count = [0u32; BINS - 1];
            let mut right_area = [0.0; BINS - 1];
            let mut right_count = [0u32; BINS - 1];

            let mut left_box = Aabb::empty();
            let mut left_sum = 0;
            let mut right_box = Aabb::empty();
            let mut right_sum = 0;
            for i in 0..BINS - 1 {
                left_sum += bins[i].count;
                left_box.grow_with(&bins[i].bounds);
                left_count[i] = left_sum;
                left_area[i] = left_box.surface_area();

                right_sum += bins[BINS - 1 - i].count;
                right_box.grow_with(&bins[BINS - 1 - i].bounds);
                right_count[BINS - 2 - i] = right_sum;
                right_area[BINS - 2 - i] = right_box.surface_area();
            }

            for i in 0..BINS - 1 {
                if left_count[i] == 0 || right_count[i] == 0 {
                    continue;
                }

                let cost = left_count[i] as f32 * left_area[i] + right_count[i] as f32 * right_area[i];
                if best.is_none_or(|best| cost < best.cost) {
                    best = Some(Split {
                        axis,
                        bin: i,
                        centroid_min,
                        bin_scale,
                        cost,
                    });
                }
            }
        }

        best
    }
}
