use crate::{
    compute_method::{ComputeMethod, THETA},
    particle::{point_mass_acceleration, Particle},
    tree::{KdTree, MAX_PARTS},
};

use glam::DVec3;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// A brute-force [`ComputeMethod`] using the CPU with
/// [rayon](https://github.com/rayon-rs/rayon).
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl ComputeMethod for BruteForce {
    #[inline]
    fn compute(&mut self, particles: &[Particle]) -> Vec<DVec3> {
        (0..particles.len())
            .into_par_iter()
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
/// [`ComputeMethod`] using the CPU with [rayon](https://github.com/rayon-rs/rayon)
/// for the force computation.
///
/// The tree build stays sequential; the per-particle traversals are independent reads
/// of the frozen tree writing to disjoint slots of the output buffer, so rayon
/// distributes them without locking.
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

        let (tree, theta) = (&self.tree, self.theta);
        (0..particles.len())
            .into_par_iter()
            .map(|i| tree.acceleration(particles, i, theta))
            .collect()
    }
}
