#[cfg(feature = "parallel")]
/// Compute methods that use multiple CPU threads.
pub mod parallel;

/// Compute methods that use one CPU thread.
pub mod sequential;

use crate::particle::Particle;
use glam::DVec3;

/// Reference value of the Barnes-Hut criterion parameter θ.
pub const THETA: f64 = 0.3;

/// Trait for algorithms computing the gravitational acceleration of every particle in
/// a store.
///
/// Implementations read the store and return one acceleration per particle, in store
/// order. They never mutate the particles: integrating the results back into the
/// store is the [simulation driver](crate::simulation)'s job, which also makes the
/// returned buffer the barrier between force evaluation and integration.
pub trait ComputeMethod {
    /// Computes the acceleration every particle of the store exerts on the particle at
    /// index `i` of the returned buffer.
    fn compute(&mut self, particles: &[Particle]) -> Vec<DVec3>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::particle::{point_mass_acceleration, samples};

    /// Checks a compute method against the direct pairwise sum.
    pub fn acceleration_computation<C: ComputeMethod>(mut cm: C) {
        let particles = samples::uniform_cloud(50, 42);
        let computed = cm.compute(&particles);

        assert_eq!(computed.len(), particles.len());
        for (i, &computed) in computed.iter().enumerate() {
            let direct = particles
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(DVec3::ZERO, |acceleration, (_, other)| {
                    acceleration
                        + point_mass_acceleration(particles[i].position, other.position, other.mass)
                });

            assert!(
                direct.abs_diff_eq(computed, 1e-9),
                "particle {i}: expected {direct}, computed {computed}"
            );
        }
    }

    pub fn empty_store<C: ComputeMethod>(mut cm: C) {
        assert!(cm.compute(&[]).is_empty());
    }
}
