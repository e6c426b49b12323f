use super::Aabb;

/// Leaves have `left == right == 0` and `blas` set to the instance index;
/// interior nodes point at two children and leave `blas` unused.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TlasNode {
    pub bounds: Aabb,
    pub left: u32,
    pub right: u32,
    pub blas: u32,
}

impl TlasNode {
    pub fn is_leaf(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// World-space hierarchy over instance bounds. Node 0 is the root.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tlas {
    /// `2 * instance_count` slots; the build fills every one of them.
    pub nodes: Vec<TlasNode>,
    pub nodes_used: usize,
}

impl Tlas {
    /// Agglomerative build: repeatedly merges the two active nodes whose union
    /// has the smallest surface area until a single root remains.
    ///
    /// `instance_bounds[i]` is the world-space box of instance `i`.
    pub fn build(instance_bounds: &[Aabb]) -> Self {
        if instance_bounds.is_empty() {
            return Self::default();
        }

        let mut nodes = vec![TlasNode::default(); 2 * instance_bounds.len()];
        let mut nodes_used = 1;
        let mut active = Vec::with_capacity(instance_bounds.len());

        for (instance, bounds) in instance_bounds.iter().enumerate() {
            nodes[nodes_used] = TlasNode {
                bounds: *bounds,
                left: 0,
                right: 0,
                blas: instance as u32,
            };
            active.push(nodes_used as u32);
            nodes_used += 1;
        }

        // `a` and `b` are positions in `active`; `b` is cached as a's best match
        // and only recomputed after a merge shrinks the active set.
        let mut a = 0;
        let mut b = find_best_match(&nodes, &active, a).unwrap_or(a);

        while active.len() > 1 {
            let Some(c) = find_best_match(&nodes, &active, b) else {
                break;
            };

            if c == a {
                let (left, right) = (active[a], active[b]);
                nodes[nodes_used] = TlasNode {
                    bounds: nodes[left as usize].bounds.union(&nodes[right as usize].bounds),
                    left,
                    right,
                    blas: 0,
                };
                active[a] = nodes_used as u32;
                nodes_used += 1;

                active.swap_remove(b);
                if a == active.len() {
                    // `a` was the last slot and swap_remove moved it into b's place.
                    a = b;
                }
                b = find_best_match(&nodes, &active, a).unwrap_or(a);
            } else {
                a = b;
                b = c;
            }
        }

        nodes[0] = nodes[active[a] as usize];
        log::debug!(
            "Built TLAS over {} instances with {} nodes",
            instance_bounds.len(),
            nodes_used
        );

        Self { nodes, nodes_used }
    }

    pub fn root(&self) -> Option<&TlasNode> {
        self.nodes.first()
    }

    pub fn used_nodes(&self) -> &[TlasNode] {
        &self.nodes[..self.nodes_used]
    }
}

fn union_area(nodes: &[TlasNode], active: &[u32], a: usize, b: usize) -> f32 {
    nodes[active[a] as usize]
        .bounds
        .union(&nodes[active[b] as usize].bounds)
        .surface_area()
}

/// Position in `active` of the node whose union with `active[a]` is smallest.
/// Ties keep the lowest position.
fn find_best_match(nodes: &[TlasNode], active: &[u32], a: usize) -> Option<usize> {
    let mut smallest = f32::INFINITY;
    let mut best = None;

    for b in 0..active.len() {
        if b == a {
            continue;
        }

        let area = union_area(nodes, active, a, b);
        if best.is_none() || area < smallest {
            smallest = area;
            best = Some(b);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use maths::Vec3;

    use super::*;

    fn unit_box_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Vec3::new(x, y, z), Vec3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    fn leaf_instances(tlas: &Tlas, node: &TlasNode, out: &mut Vec<u32>) {
        if node.is_leaf() {
            out.push(node.blas);
        } else {
            leaf_instances(tlas, &tlas.nodes[node.left as usize], out);
            leaf_instances(tlas, &tlas.nodes[node.right as usize], out);
        }
    }

    fn assert_children_inside_parents(tlas: &Tlas, node: &TlasNode) {
        if node.is_leaf() {
            return;
        }
        for child in [node.left, node.right] {
            let child = &tlas.nodes[child as usize];
            assert!(node.bounds.contains(&child.bounds, 0.0));
            assert_children_inside_parents(tlas, child);
        }
    }

    #[test]
    fn test_empty_has_no_root() {
        let tlas = Tlas::build(&[]);
        assert!(tlas.root().is_none());
        assert_eq!(tlas.nodes_used, 0);
    }

    #[test]
    fn test_single_instance_becomes_root_leaf() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let tlas = Tlas::build(&[bounds]);

        let root = tlas.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.blas, 0);
        assert_eq!(root.bounds, bounds);
        assert_eq!(tlas.nodes_used, 2);
    }

    #[test]
    fn test_two_instances_share_one_interior_root() {
        let tlas = Tlas::build(&[unit_box_at(0.0, 0.0, 0.0), unit_box_at(5.0, 0.0, 0.0)]);

        let root = tlas.root().unwrap();
        assert!(!root.is_leaf());
        let left = &tlas.nodes[root.left as usize];
        let right = &tlas.nodes[root.right as usize];
        assert!(left.is_leaf() && right.is_leaf());

        let mut instances = vec![left.blas, right.blas];
        instances.sort_unstable();
        assert_eq!(instances, vec![0, 1]);
        assert_eq!(root.bounds, Aabb::new(Vec3::ZERO, Vec3::new(6.0, 1.0, 1.0)));
    }

    #[test]
    fn test_nearest_pairs_merge_first() {
        // Two tight clusters far apart: each cluster must become its own subtree.
        let bounds = [
            unit_box_at(0.0, 0.0, 0.0),
            unit_box_at(100.0, 0.0, 0.0),
            unit_box_at(1.5, 0.0, 0.0),
            unit_box_at(101.5, 0.0, 0.0),
        ];
        let tlas = Tlas::build(&bounds);
        let root = tlas.root().unwrap();

        let mut left = Vec::new();
        let mut right = Vec::new();
        leaf_instances(&tlas, &tlas.nodes[root.left as usize], &mut left);
        leaf_instances(&tlas, &tlas.nodes[root.right as usize], &mut right);
        left.sort_unstable();
        right.sort_unstable();

        let mut clusters = vec![left, right];
        clusters.sort();
        assert_eq!(clusters, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_root_covers_all_and_leaves_are_a_permutation() {
        let mut bounds = Vec::new();
        for i in 0..37 {
            let f = i as f32;
            bounds.push(unit_box_at((f * 7.3) % 23.0, (f * 3.1) % 11.0, (f * 1.7) % 5.0));
        }
        let tlas = Tlas::build(&bounds);

        let mut expected = Aabb::empty();
        for b in &bounds {
            expected.grow_with(b);
        }
        let root = tlas.root().unwrap();
        assert_eq!(root.bounds, expected);
        assert_eq!(tlas.nodes_used, 2 * bounds.len());

        let mut instances = Vec::new();
        leaf_instances(&tlas, root, &mut instances);
        instances.sort_unstable();
        assert_eq!(instances, (0..37).collect::<Vec<u32>>());

        assert_children_inside_parents(&tlas, root);
    }

    fn topology(tlas: &Tlas) -> Vec<(u32, u32, u32)> {
        tlas.used_nodes()
            .iter()
            .map(|node| (node.left, node.right, node.blas))
            .collect()
    }

    #[test]
    fn test_equal_area_ties_merge_lowest_positions() {
        // Several pairs share the same union area; the lowest active position
        // wins each tie and merges only happen on mutual best matches.
        let bounds = [
            unit_box_at(0.0, 0.0, 0.0),
            unit_box_at(2.0, 2.0, 0.0),
            unit_box_at(6.0, 4.0, 0.0),
            unit_box_at(4.0, 4.0, 0.0),
            unit_box_at(6.0, 0.0, 0.0),
            unit_box_at(4.0, 0.0, 0.0),
        ];
        let tlas = Tlas::build(&bounds);

        assert_eq!(
            topology(&tlas),
            vec![
                (10, 8, 0),
                (0, 0, 0),
                (0, 0, 1),
                (0, 0, 2),
                (0, 0, 3),
                (0, 0, 4),
                (0, 0, 5),
                (6, 5, 0),
                (1, 2, 0),
                (3, 4, 0),
                (9, 7, 0),
                (10, 8, 0),
            ]
        );
        assert_eq!(tlas.nodes[9].bounds, Aabb::new(Vec3::new(4.0, 4.0, 0.0), Vec3::new(7.0, 5.0, 1.0)));
    }

    #[test]
    fn test_evenly_spaced_row_pairs_neighbours() {
        let bounds: Vec<Aabb> = (0..4).map(|i| unit_box_at(i as f32 * 2.0, 0.0, 0.0)).collect();
        let tlas = Tlas::build(&bounds);

        assert_eq!(
            topology(&tlas),
            vec![
                (6, 5, 0),
                (0, 0, 0),
                (0, 0, 1),
                (0, 0, 2),
                (0, 0, 3),
                (1, 2, 0),
                (3, 4, 0),
                (6, 5, 0),
            ]
        );
    }

    #[test]
    fn test_identical_boxes_terminate() {
        let bounds = vec![unit_box_at(2.0, 2.0, 2.0); 9];
        let tlas = Tlas::build(&bounds);

        let mut instances = Vec::new();
        leaf_instances(&tlas, tlas.root().unwrap(), &mut instances);
        assert_eq!(instances.len(), 9);
    }

    #[test]
    fn test_evenly_spaced_row_terminates() {
        let bounds: Vec<Aabb> = (0..16).map(|i| unit_box_at(i as f32 * 2.0, 0.0, 0.0)).collect();
        let tlas = Tlas::build(&bounds);

        let mut instances = Vec::new();
        leaf_instances(&tlas, tlas.root().unwrap(), &mut instances);
        instances.sort_unstable();
        assert_eq!(instances, (0..16).collect::<Vec<u32>>());
    }
}
