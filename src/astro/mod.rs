//! A module for computing simple Keplerian orbits, and for connecting two
//! points on them.
//!
//! The important items in this module are:
//! - [Orbit], which represents an orbit of a primary body around a
//!   secondary. It is possible to customize the primary and secondary bodies
//!   via the type parameters.
//!   - [TimedOrbit] pins an orbit to a moment of periapsis passage, so it can
//!     be sampled at any universal time
//! - [CartesianState], which represents a position and velocity
//! - [lambert], which solves the two-point boundary value problem

pub mod lambert;
mod orbit;
mod orbit_methods;
mod state;

pub use orbit::{Orbit, TimedOrbit};
pub use state::CartesianState;

/// A point mass with no other physical properties.
///
/// Useful for satisfying a [HasMass] trait bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass(f64);

/// A trait indicating this object can be used in physical computations that
/// require a massive body.
pub trait HasMass {
    /// The standard gravitational parameter of this object
    fn mu(&self) -> f64;

    fn to_point_mass(&self) -> PointMass {
        PointMass::with_mu(self.mu())
    }
}

impl PointMass {
    /// Constructs a new mass
    pub fn with_mu(mu: f64) -> Self {
        Self(mu)
    }
}

impl HasMass for PointMass {
    fn mu(&self) -> f64 {
        self.0
    }
}

impl<T> HasMass for &T
where
    T: HasMass,
{
    fn mu(&self) -> f64 {
        (*self).mu()
    }
}
