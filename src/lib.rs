#![warn(missing_docs)]
//! # Gravitree
//!
//! Gravitree computes the gravitational acceleration of N-body systems using a
//! [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation) k-d tree.
//!
//! ## Goals
//!
//! The crate focuses on the computation of the interactions between particles and the
//! data structure that makes it fast: a binary k-d tree whose internal nodes summarise
//! the total mass and centre of mass of their subtree. Particles whose summarising node
//! is far enough away are approximated by that summary instead of being visited
//! individually, turning the O(n²) pairwise sum into an O(n log n) traversal.
//!
//! ### Computation algorithms
//!
//! There are currently 2 algorithms:
//! [Brute-force](https://en.wikipedia.org/wiki/N-body_problem#Simulation) and
//! [Barnes-Hut](https://en.wikipedia.org/wiki/Barnes%E2%80%93Hut_simulation).
//!
//! Generally speaking, the Brute-force algorithm is more accurate, but slower. The
//! Barnes-Hut algorithm allows trading accuracy for speed by increasing the `theta`
//! parameter: with `theta` set to 0 it degenerates to the exact pairwise sum.
//!
//! Gravitree uses [rayon](https://github.com/rayon-rs/rayon) for parallelisation.
//! Enable the `parallel` feature to access the relevant algorithms.
//!
//! ## Using Gravitree
//!
//! A simulation owns a flat store of [`Particles`](particle::Particle) and advances it
//! with [`simple_sim`](simulation::simple_sim) or, for a custom accuracy/speed
//! trade-off, any [`ComputeMethod`](compute_method::ComputeMethod) through
//! [`simple_sim_with`](simulation::simple_sim_with).
//!
//! ```
//! use gravitree::prelude::*;
//! use glam::DVec3;
//!
//! let mut bodies = vec![
//!     Particle::new(DVec3::ZERO, DVec3::ZERO, 1.0),
//!     Particle::new(DVec3::X, DVec3::Y, 1e-20),
//! ];
//!
//! // One hundred timesteps with the reference Barnes-Hut configuration.
//! simple_sim(&mut bodies, 1e-3, 100);
//! ```
//!
//! The tree itself is available for callers that want to drive the traversal directly:
//!
//! ```
//! use gravitree::prelude::*;
//! use glam::DVec3;
//!
//! # let bodies = vec![
//! #     Particle::new(DVec3::ZERO, DVec3::ZERO, 1.0),
//! #     Particle::new(DVec3::X, DVec3::Y, 1e-20),
//! # ];
//! let mut tree = KdTree::default();
//! tree.build(&bodies);
//!
//! let acceleration = tree.acceleration(&bodies, 1, 0.3);
//! ```

/// Algorithms computing the acceleration of every particle in a store.
pub mod compute_method;
/// Particle type and the exact pairwise gravity kernel.
pub mod particle;
/// Timestep driver.
pub mod simulation;
/// k-d tree and space partitioning implementation.
pub mod tree;

/// Commonly used types, re-exported.
pub mod prelude {
    #[cfg(feature = "parallel")]
    pub use crate::compute_method::parallel;
    pub use crate::compute_method::{sequential, ComputeMethod, THETA};
    pub use crate::particle::Particle;
    pub use crate::simulation::{simple_sim, simple_sim_with, step};
    pub use crate::tree::{KdTree, Node, NodeId, MAX_PARTS};
}
