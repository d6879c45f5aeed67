use crate::{
    compute_method::{ComputeMethod, THETA},
    particle::{point_mass_acceleration, Particle},
    tree::{KdTree, MAX_PARTS},
};

use glam::DVec3;

/// A brute-force [`ComputeMethod`] using the CPU.
///
/// Sums the exact pairwise interaction over every other particle, in O(n²). Mostly
/// useful as an accuracy reference for the tree-based methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl ComputeMethod for BruteForce {
    #[inline]
    fn compute(&mut self, particles: &[Particle]) -> Vec<DVec3> {
        (0..particles.len())
            .map(|i| {
                particles
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
                    })
            })
            .collect()
    }
}

/// [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation)
/// [`ComputeMethod`] using the CPU.
///
/// Rebuilds its owned [`KdTree`] from the current positions on every call, reusing
/// the tree's buffers, then walks it once per particle.
#[derive(Clone, Debug)]
pub struct BarnesHut {
    /// Parameter ruling the accuracy and speed of the algorithm. If 0, behaves the
    /// same as [`BruteForce`].
    pub theta: f64,
    tree: KdTree,
}

impl Default for BarnesHut {
    #[inline]
    fn default() -> Self {
        Self::new(THETA)
    }
}

impl BarnesHut {
    /// Creates a new [`BarnesHut`] compute method with the given θ and the default
    /// leaf threshold [`MAX_PARTS`].
    #[inline]
    pub fn new(theta: f64) -> Self {
        Self::with_max_parts(theta, MAX_PARTS)
    }

    /// Creates a new [`BarnesHut`] compute method with the given θ and leaf
    /// threshold.
    #[inline]
    pub fn with_max_parts(theta: f64, max_parts: usize) -> Self {
        Self {
            theta,
            tree: KdTree::new(max_parts),
        }
    }
}

impl ComputeMethod for BarnesHut {
    fn compute(&mut self, particles: &[Particle]) -> Vec<DVec3> {
        if particles.is_empty() {
            return Vec::new();
        }

        self.tree.build(particles);

        (0..particles.len())
            .map(|i| self.tree.acceleration(particles, i, self.theta))
            .collect()
    }
}
