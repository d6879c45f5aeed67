use crate::{
    compute_method::{sequential, ComputeMethod, THETA},
    particle::Particle,
};

/// Advances the particle store by one timestep of length `dt` using the given compute
/// method.
///
/// The accelerations of every particle are fully computed before any particle is
/// mutated, then each particle is integrated with semi-implicit Euler: the velocity
/// is updated from the acceleration first, the position from the new velocity second.
pub fn step<C>(particles: &mut [Particle], dt: f64, compute: &mut C)
where
    C: ComputeMethod + ?Sized,
{
    let accelerations = compute.compute(particles);

    for (particle, acceleration) in particles.iter_mut().zip(accelerations) {
        particle.velocity += acceleration * dt;
        particle.position += particle.velocity * dt;
    }
}

/// Runs `steps` timesteps of length `dt` over the particle store with the reference
/// Barnes-Hut configuration (θ = [`THETA`], the default leaf threshold).
///
/// The store must be non-empty with strictly positive, finite masses; malformed input
/// is rejected here rather than inside the hot path.
#[inline]
pub fn simple_sim(particles: &mut [Particle], dt: f64, steps: usize) {
    simple_sim_with(particles, dt, steps, &mut sequential::BarnesHut::new(THETA));
}

/// Runs `steps` timesteps of length `dt` over the particle store with the given
/// compute method.
///
/// The store must be non-empty with strictly positive, finite masses; malformed input
/// is rejected here rather than inside the hot path.
pub fn simple_sim_with<C>(particles: &mut [Particle], dt: f64, steps: usize, compute: &mut C)
where
    C: ComputeMethod + ?Sized,
{
    assert!(!particles.is_empty(), "empty particle store");
    assert!(
        particles.iter().all(|p| p.mass > 0.0 && p.mass.is_finite()),
        "particle masses must be strictly positive and finite"
    );

    for _ in 0..steps {
        step(particles, dt, compute);
    }
}
