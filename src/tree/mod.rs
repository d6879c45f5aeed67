/// Bounding box and in-place median selection.
pub mod partition;

use crate::particle::{point_mass_acceleration, Particle};
use partition::{select_nth_by_key, BoundingBox};

use glam::DVec3;
use std::io::{self, Write};
use std::ops::Range;

/// Default maximum number of particle indices stored directly in a leaf.
pub const MAX_PARTS: usize = 7;

/// Index of a [`Node`] in a [`KdTree`].
pub type NodeId = u32;

/// Node of a [`KdTree`], either a terminal bucket of particle indices or a summary of
/// its subtree with two children.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Node without children, holding between 1 and K particles.
    Leaf {
        /// Range of the tree's [index permutation](KdTree::indices) holding the
        /// particle indices of this leaf.
        particles: Range<usize>,
    },
    /// Node with two children, summarising the particles reachable through them.
    Internal {
        /// Axis this node splits on: 0, 1 or 2 for x, y or z.
        split_dim: usize,
        /// Coordinate threshold along [`split_dim`](Node::Internal::split_dim)
        /// separating the two children.
        split_val: f64,
        /// Total mass of the subtree.
        mass: f64,
        /// Centre of mass of the subtree.
        com: DVec3,
        /// Spatial extent of the subtree along
        /// [`split_dim`](Node::Internal::split_dim).
        size: f64,
        /// Left child, holding the particles below the split.
        left: NodeId,
        /// Right child, holding the particles above the split.
        right: NodeId,
    },
}

/// A binary k-d tree over a particle store, stored as a flat arena.
///
/// Nodes live in a single growable vector and reference their children by offset into
/// that same vector; children strictly follow their parent in allocation order, so the
/// structure is trivially cycle-free. The tree also owns the index permutation its
/// leaves point into. Both buffers are reused across rebuilds — the tree is rebuilt
/// from scratch every timestep, there is no incremental update.
#[derive(Clone, Debug)]
pub struct KdTree {
    nodes: Vec<Node>,
    indices: Vec<usize>,
    max_parts: usize,
}

impl Default for KdTree {
    #[inline]
    fn default() -> Self {
        Self::new(MAX_PARTS)
    }
}

impl KdTree {
    /// Creates a new empty [`KdTree`] whose leaves hold at most `max_parts` particles.
    #[inline]
    pub fn new(max_parts: usize) -> Self {
        assert!(max_parts >= 1, "leaves must hold at least one particle");

        Self {
            nodes: Vec::new(),
            indices: Vec::new(),
            max_parts,
        }
    }

    /// Returns the nodes of the tree in allocation order, the root first.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the index permutation of the last build. [`Leaf`](Node::Leaf) ranges
    /// index into this slice; after a build it holds every particle index exactly
    /// once.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the maximum number of particles a leaf of this tree holds.
    #[inline]
    pub fn max_parts(&self) -> usize {
        self.max_parts
    }

    /// Returns the particle indices held by the given leaf range.
    #[inline]
    pub fn leaf_particles(&self, range: &Range<usize>) -> &[usize] {
        &self.indices[range.clone()]
    }

    /// Builds the tree over all the given particles, replacing any previous build, and
    /// returns the root node (always 0).
    ///
    /// The particle store must be non-empty with strictly positive, finite masses;
    /// this is a precondition validated by the simulation driver, not here.
    pub fn build(&mut self, particles: &[Particle]) -> NodeId {
        debug_assert!(!particles.is_empty());

        self.nodes.clear();
        self.indices.clear();
        self.indices.extend(0..particles.len());

        self.build_range(particles, 0, particles.len())
    }

    /// Recursively builds the subtree over `indices[start..end]` and returns its root.
    fn build_range(&mut self, particles: &[Particle], start: usize, end: usize) -> NodeId {
        let id = self.nodes.len() as NodeId;

        if end - start <= self.max_parts {
            self.nodes.push(Node::Leaf {
                particles: start..end,
            });
            return id;
        }

        // One pass over the range for the total mass, centre of mass and bounds.
        let mut bbox = BoundingBox::default();
        let mut mass = 0.0;
        let mut com = DVec3::ZERO;
        for &i in &self.indices[start..end] {
            let p = &particles[i];
            mass += p.mass;
            com += p.position * p.mass;
            bbox.extend(p.position);
        }
        com /= mass;

        let split_dim = bbox.widest_axis();
        let size = bbox.size()[split_dim];

        let mid = (start + end) / 2;
        select_nth_by_key(&mut self.indices[start..end], mid - start, |i| {
            particles[i].position[split_dim]
        });
        let split_val = particles[self.indices[mid]].position[split_dim];

        // Reserve this node's slot so both children follow it in allocation order.
        self.nodes.push(Node::Leaf { particles: 0..0 });
        let left = self.build_range(particles, start, mid);
        let right = self.build_range(particles, mid, end);

        self.nodes[id as usize] = Node::Internal {
            split_dim,
            split_val,
            mass,
            com,
            size,
            left,
            right,
        };
        id
    }

    /// Computes the net gravitational acceleration exerted on the particle at index
    /// `target` by every other particle of the store, approximating nodes that pass
    /// the Barnes-Hut criterion `size² < θ²·d²` by their mass/centre-of-mass summary.
    ///
    /// With `theta` set to 0 the traversal always recurses to the leaves and the
    /// result equals the exact pairwise sum. The tree must have been
    /// [built](KdTree::build) over the same particle store.
    #[inline]
    pub fn acceleration(&self, particles: &[Particle], target: usize, theta: f64) -> DVec3 {
        self.acceleration_from(0, particles, target, theta)
    }

    fn acceleration_from(
        &self,
        node: NodeId,
        particles: &[Particle],
        target: usize,
        theta: f64,
    ) -> DVec3 {
        let position = particles[target].position;

        match &self.nodes[node as usize] {
            Node::Leaf { particles: range } => self
                .leaf_particles(range)
                .iter()
                .filter(|&&j| j != target)
                .fold(DVec3::ZERO, |acceleration, &j| {
                    acceleration
                        + point_mass_acceleration(position, particles[j].position, particles[j].mass)
                }),
            Node::Internal {
                mass,
                com,
                size,
                left,
                right,
                ..
            } => {
                let dir = *com - position;
                let mag_2 = dir.length_squared();

                if size * size < theta * theta * mag_2 {
                    // Far enough: the whole subtree acts as a single point-mass.
                    dir * (mass / (mag_2 * mag_2.sqrt()))
                } else {
                    self.acceleration_from(*left, particles, target, theta)
                        + self.acceleration_from(*right, particles, target, theta)
                }
            }
        }
    }

    /// Returns the number of nodes on the longest root-to-leaf path, or 0 for a tree
    /// that has not been built.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.depth_from(0)
        }
    }

    fn depth_from(&self, node: NodeId) -> usize {
        match &self.nodes[node as usize] {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => {
                1 + self.depth_from(*left).max(self.depth_from(*right))
            }
        }
    }

    /// Writes a textual snapshot of the tree for debugging: the node count, then one
    /// record per node in allocation order — `L <count>` followed by that many
    /// position triples for a leaf, `I <split_dim> <split_val> <left> <right>` for an
    /// internal node.
    ///
    /// This is a debugging aid, not a stable format.
    pub fn write_snapshot<W: Write>(&self, particles: &[Particle], writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.nodes.len())?;

        for node in &self.nodes {
            match node {
                Node::Leaf { particles: range } => {
                    writeln!(writer, "L {}", range.len())?;
                    for &i in self.leaf_particles(range) {
                        let p = particles[i].position;
                        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
                    }
                }
                Node::Internal {
                    split_dim,
                    split_val,
                    left,
                    right,
                    ..
                } => {
                    writeln!(writer, "I {} {} {} {}", split_dim, split_val, left, right)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::samples;

    /// Collects the particle indices reachable from `node`.
    fn subtree_indices(tree: &KdTree, node: NodeId, out: &mut Vec<usize>) {
        match &tree.nodes()[node as usize] {
            Node::Leaf { particles } => out.extend_from_slice(tree.leaf_particles(particles)),
            Node::Internal { left, right, .. } => {
                subtree_indices(tree, *left, out);
                subtree_indices(tree, *right, out);
            }
        }
    }

    /// Checks that every particle of every leaf lies inside the bounds accumulated
    /// from the split planes above it.
    fn assert_bounds(
        tree: &KdTree,
        particles: &[Particle],
        node: NodeId,
        mut min: DVec3,
        mut max: DVec3,
    ) {
        match &tree.nodes()[node as usize] {
            Node::Leaf { particles: range } => {
                for &i in tree.leaf_particles(range) {
                    let p = particles[i].position;
                    for dim in 0..3 {
                        assert!(p[dim] >= min[dim] && p[dim] <= max[dim]);
                    }
                }
            }
            Node::Internal {
                split_dim,
                split_val,
                left,
                right,
                ..
            } => {
                let (dim, val) = (*split_dim, *split_val);
                let (old_min, old_max) = (min[dim], max[dim]);

                max[dim] = val;
                assert_bounds(tree, particles, *left, min, max);
                max[dim] = old_max;

                min[dim] = val;
                assert_bounds(tree, particles, *right, min, max);
                min[dim] = old_min;
            }
        }
    }

    /// Recomputes the mass and weighted position sum of the subtree directly and
    /// checks internal summaries against them. Returns the mass, the weighted
    /// position sum and the sum of `mass · |position|` used to scale tolerances.
    fn assert_aggregates(tree: &KdTree, particles: &[Particle], node: NodeId) -> (f64, DVec3, f64) {
        match &tree.nodes()[node as usize] {
            Node::Leaf { particles: range } => tree.leaf_particles(range).iter().fold(
                (0.0, DVec3::ZERO, 0.0),
                |(mass, weighted, scale), &i| {
                    (
                        mass + particles[i].mass,
                        weighted + particles[i].position * particles[i].mass,
                        scale + particles[i].mass * particles[i].position.length(),
                    )
                },
            ),
            Node::Internal {
                mass,
                com,
                left,
                right,
                ..
            } => {
                let (m1, w1, s1) = assert_aggregates(tree, particles, *left);
                let (m2, w2, s2) = assert_aggregates(tree, particles, *right);
                let (m, w, s) = (m1 + m2, w1 + w2, s1 + s2);

                assert!((mass - m).abs() <= 1e-9 * m.abs());
                // Weighted sums can cancel, so the tolerance scales with the
                // magnitudes that went into them rather than with the result.
                assert!((*com * m).abs_diff_eq(w, 1e-9 * s));

                (m, w, s)
            }
        }
    }

    #[test]
    fn small_store_is_a_single_leaf() {
        let particles = samples::two_bodies();
        let mut tree = KdTree::default();
        let root = tree.build(&particles);

        assert_eq!(root, 0);
        assert_eq!(tree.nodes().len(), 1);
        match &tree.nodes()[0] {
            Node::Leaf { particles: range } => assert_eq!(range.len(), 2),
            _ => panic!("root isn't a leaf for a store below the leaf threshold"),
        }
    }

    #[test]
    fn leaves_hold_every_index_exactly_once() {
        for max_parts in [1, 3, MAX_PARTS] {
            let particles = samples::uniform_cloud(1000, 3);
            let mut tree = KdTree::new(max_parts);
            tree.build(&particles);

            let mut held = Vec::new();
            subtree_indices(&tree, 0, &mut held);
            held.sort_unstable();
            assert!(held.into_iter().eq(0..particles.len()));
        }
    }

    #[test]
    fn split_planes_bound_their_subtrees() {
        let particles = samples::circular_orbits(300);
        let mut tree = KdTree::default();
        tree.build(&particles);

        assert_bounds(&tree, &particles, 0, DVec3::NEG_INFINITY, DVec3::INFINITY);
    }

    #[test]
    fn internal_nodes_summarise_mass_and_centre_of_mass() {
        let particles = samples::circular_orbits(200);
        let mut tree = KdTree::default();
        tree.build(&particles);

        assert_aggregates(&tree, &particles, 0);
    }

    #[test]
    fn leaf_occupancy_and_logarithmic_depth() {
        let n = 10_000;
        let particles = samples::uniform_cloud(n, 5);
        let mut tree = KdTree::default();
        tree.build(&particles);

        for node in tree.nodes() {
            if let Node::Leaf { particles: range } = node {
                assert!((1..=MAX_PARTS).contains(&range.len()));
            }
        }

        // The median split halves every range, so the depth is the number of
        // halvings needed to reach the leaf threshold, plus the root.
        let expected = usize::BITS - n.div_ceil(MAX_PARTS).next_power_of_two().leading_zeros();
        assert!(tree.depth() <= expected as usize + 1);
    }

    #[test]
    fn coincident_particles_still_build() {
        let particles = vec![Particle::new(DVec3::splat(0.5), DVec3::ZERO, 1.0); 20];
        let mut tree = KdTree::default();
        tree.build(&particles);

        let mut held = Vec::new();
        subtree_indices(&tree, 0, &mut held);
        held.sort_unstable();
        assert!(held.into_iter().eq(0..particles.len()));

        // Zero separation divides by zero; the non-finite result propagates.
        let acceleration = tree.acceleration(&particles, 0, 0.3);
        assert!(acceleration.x.is_nan());
    }

    #[test]
    fn theta_zero_matches_the_direct_sum() {
        let particles = samples::uniform_cloud(50, 9);
        let mut tree = KdTree::default();
        tree.build(&particles);

        for i in 0..particles.len() {
            let direct = particles
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(DVec3::ZERO, |acceleration, (_, other)| {
                    acceleration
                        + point_mass_acceleration(
                            particles[i].position,
                            other.position,
                            other.mass,
                        )
                });

            assert!(tree.acceleration(&particles, i, 0.0).abs_diff_eq(direct, 1e-9));
        }
    }

    #[test]
    fn snapshot_lists_every_node() {
        let particles = samples::circular_orbits(30);
        let mut tree = KdTree::default();
        tree.build(&particles);

        let mut snapshot = Vec::new();
        tree.write_snapshot(&particles, &mut snapshot).unwrap();
        let snapshot = String::from_utf8(snapshot).unwrap();
        let mut lines = snapshot.lines();

        assert_eq!(
            lines.next().unwrap().parse::<usize>().unwrap(),
            tree.nodes().len()
        );
        let records = lines
            .filter(|l| l.starts_with("L ") || l.starts_with("I "))
            .count();
        assert_eq!(records, tree.nodes().len());
    }
}
