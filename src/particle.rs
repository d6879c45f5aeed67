use glam::DVec3;

/// A body of the simulation, stored in a flat, indexable collection owned by the caller.
///
/// The order of a particle store is stable across a run: tree construction permutes a
/// separate index buffer, never the store itself, and only the
/// [integration step](crate::simulation::step) mutates particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// The position of the particle in space.
    pub position: DVec3,
    /// The velocity of the particle.
    pub velocity: DVec3,
    /// The mass of the particle. Expected to be strictly positive; a zero or negative
    /// mass is a precondition violation of the tree builder.
    pub mass: f64,
}

impl Particle {
    /// Creates a new [`Particle`] with the given position, velocity and mass.
    #[inline]
    pub const fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }
}

/// Acceleration exerted at `at` by a point-mass of the given `mass` located at
/// `position`, following Newton's law of universal gravitation with G = 1.
///
/// This is the only exact-physics routine of the crate; leaves of the tree and the
/// brute-force methods sum it pairwise, and internal nodes reuse the same expression
/// with their mass/centre-of-mass summary.
///
/// The division is performed unconditionally: a zero separation yields non-finite
/// components following IEEE-754 semantics, which propagate through any sum they
/// participate in. No softening term is applied.
#[inline]
pub fn point_mass_acceleration(at: DVec3, position: DVec3, mass: f64) -> DVec3 {
    let dir = position - at;
    let mag_2 = dir.length_squared();

    dir * (mass / (mag_2 * mag_2.sqrt()))
}

/// Returns the total kinetic energy of the particles.
#[inline]
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles
        .iter()
        .map(|p| 0.5 * p.mass * p.velocity.length_squared())
        .sum()
}

/// Returns the total gravitational potential energy of the particles, summed over
/// every unordered pair.
pub fn potential_energy(particles: &[Particle]) -> f64 {
    let mut energy = 0.0;
    for (i, p1) in particles.iter().enumerate() {
        for p2 in &particles[i + 1..] {
            energy -= p1.mass * p2.mass / p1.position.distance(p2.position);
        }
    }
    energy
}

/// Returns the total mechanical energy of the particles.
///
/// Useful to bound the drift of an integration: the exact dynamics conserve this
/// quantity.
#[inline]
pub fn total_energy(particles: &[Particle]) -> f64 {
    kinetic_energy(particles) + potential_energy(particles)
}
