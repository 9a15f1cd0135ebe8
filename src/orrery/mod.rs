//! Catalogue of bodies on fixed Keplerian orbits, and the read-only view the
//! transfer code needs of them.

use nalgebra::{Unit, Vector3};

use crate::astro::{CartesianState, HasMass, PointMass};

mod body;
mod orrery;

pub use body::{Body, BodyID, BodyInfo, BodyState};
pub use orrery::{OrbitingBody, Orrery};

/// Something that moves on a known orbit around a primary.
///
/// Positions and velocities are relative to the primary, in its inertial
/// (z-up) frame.
pub trait OrbitState: HasMass {
    fn name(&self) -> &str;

    /// State relative to the primary at universal time `time`. `None` if the
    /// orbit couldn't be propagated that far.
    fn state_at(&self, time: f64) -> Option<CartesianState<PointMass>>;

    fn position_at(&self, time: f64) -> Option<Vector3<f64>> {
        self.state_at(time).map(|s| s.position())
    }

    fn velocity_at(&self, time: f64) -> Option<Vector3<f64>> {
        self.state_at(time).map(|s| s.velocity())
    }

    fn orbit_normal(&self) -> Unit<Vector3<f64>>;

    fn semimajor_axis(&self) -> f64;

    fn period(&self) -> Option<f64>;

    fn primary_mu(&self) -> f64;

    fn primary_id(&self) -> BodyID;

    /// Equatorial radius of the body itself.
    fn radius(&self) -> f64;
}
