use std::f64::consts::PI;

use nalgebra::{Rotation3, Unit, Vector3};

use super::{CartesianState, HasMass};
use crate::math::geometry::{always_find_rotation, directed_angle};

#[derive(Debug, Clone, Copy)]
pub struct Orbit<P, S> {
    primary: P,
    secondary: S,
    /// Encodes the orientation of the orbit: it moves the xy plane to the
    /// orbital plane, and x to point towards periapsis.
    rotation: Rotation3<f64>,
    /// (semimajor axis)^-1. It's easier to use this instead of a directly,
    /// because in parabolic orbits, a = infty.
    alpha: f64,
    /// Semi-latus rectum
    slr: f64,
}

/// An orbit that knows when its secondary passes periapsis, and so can be
/// sampled at any time.
#[derive(Debug, Clone, Copy)]
pub struct TimedOrbit<P, S> {
    orbit: Orbit<P, S>,
    time_at_periapsis: f64,
}

impl<P, S> Orbit<P, S> {
    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    pub fn as_ref(&self) -> Orbit<&P, &S> {
        Orbit {
            primary: &self.primary,
            secondary: &self.secondary,
            rotation: self.rotation,
            alpha: self.alpha,
            slr: self.slr,
        }
    }

    pub fn with_secondary<S2>(self, new_secondary: S2) -> Orbit<P, S2> {
        Orbit {
            primary: self.primary,
            secondary: new_secondary,
            rotation: self.rotation,
            alpha: self.alpha,
            slr: self.slr,
        }
    }

    pub fn from_kepler(
        primary: P,
        secondary: S,
        a: f64,
        ecc: f64,
        incl: f64,
        lan: f64,
        argp: f64,
    ) -> Self {
        Orbit {
            primary,
            secondary,
            rotation: rotation_from_angles(incl, lan, argp),
            alpha: a.recip(),
            slr: a * (1.0 - ecc * ecc),
        }
    }

    // -- Axes and vectors --

    pub fn rotation(&self) -> Rotation3<f64> {
        self.rotation
    }

    pub fn periapse_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation() * Vector3::x_axis()
    }

    pub fn normal_vector(&self) -> Unit<Vector3<f64>> {
        self.rotation() * Vector3::z_axis()
    }

    pub fn asc_node_vector(&self) -> Unit<Vector3<f64>> {
        let v = Vector3::z().cross(&self.normal_vector());
        Unit::try_new(v, 1e-20).unwrap_or_else(|| self.periapse_vector())
    }

    // -- Orbital elements --

    pub fn semimajor_axis(&self) -> f64 {
        self.alpha.recip()
    }

    pub fn eccentricity(&self) -> f64 {
        // l = a(1-e^2), so e^2 = 1 - l/a
        let e_squared = 1.0 - self.slr * self.alpha;

        if e_squared >= 0.0 {
            e_squared.sqrt()
        } else if e_squared > -1e-9 {
            // If we're just barely below zero, round up to zero.
            0.0
        } else {
            panic!(
                "Illegal orbit configuration: alpha = {}, slr = {}, e^2 computed as {}",
                self.alpha, self.slr, e_squared
            )
        }
    }

    pub fn inclination(&self) -> f64 {
        // Inclination is the angle the normal makes with z
        self.normal_vector().angle(&Vector3::z())
    }

    pub fn long_asc_node(&self) -> f64 {
        // Longitude of ascending node is the directed angle from x to the ascending
        // node
        directed_angle(&Vector3::x(), &self.asc_node_vector(), &Vector3::z())
    }

    pub fn arg_periapse(&self) -> f64 {
        // Argument of periapsis is the directed angle from the ascending node to the
        // periapsis
        directed_angle(
            &self.asc_node_vector(),
            &self.periapse_vector(),
            &self.normal_vector(),
        )
    }

    // -- Other geometric characteristics --

    pub fn is_closed(&self) -> bool {
        self.alpha > 0.0
    }

    pub fn semilatus_rectum(&self) -> f64 {
        self.slr
    }

    pub fn periapsis(&self) -> f64 {
        // the periapsis is a(1-e), but when e = 1 that's got problems
        // a(1-e) = a(1-e^2)/(1+e) = l / (1+e)
        self.slr / (1.0 + self.eccentricity())
    }

    pub fn apoapsis(&self) -> Option<f64> {
        if self.is_closed() {
            Some(2.0 * self.semimajor_axis() - self.periapsis())
        } else {
            None
        }
    }
}

impl<P: HasMass, S> Orbit<P, S> {
    pub fn from_cartesian(
        primary: P,
        secondary: S,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Self {
        // Compute some physical quantities for the orbit.
        let mu = primary.mu();
        let r = position.norm();
        let energy = velocity.norm_squared() / 2.0 - mu / r;
        let ang_mom = position.cross(velocity);

        // LRL vector = v x h / mu - r/|r|
        let lrl = velocity.cross(&ang_mom) / mu - position / r;

        // We want to rotate this orbit into a standard frame. Unfortunately, this
        // might be ambiguous, if either angular momentum or the LRL vector are too
        // close to zero. So we use a particularly cautious method.
        let rotation = always_find_rotation(&ang_mom, &lrl, 1e-20);

        Self {
            primary,
            secondary,
            rotation,
            alpha: -2.0 * energy / mu,
            slr: ang_mom.norm_squared() / mu,
        }
    }

    // -- Physical orbital characteristics --

    pub fn energy(&self) -> f64 {
        // -2E = mu / a
        -self.primary.mu() * self.alpha / 2.0
    }

    pub fn beta(&self) -> f64 {
        self.primary.mu() * self.alpha
    }

    pub fn angular_momentum(&self) -> f64 {
        // l = h^2/mu
        (self.slr * self.primary.mu()).sqrt()
    }

    pub fn period(&self) -> Option<f64> {
        if self.is_closed() {
            Some(2.0 * PI * (self.semimajor_axis().powi(3) / self.primary.mu()).sqrt())
        } else {
            None
        }
    }

    pub fn periapsis_velocity(&self) -> f64 {
        // Since h = r cross v, which are perpendicular at apeses
        self.angular_momentum() / self.periapsis()
    }

    pub fn apoapsis_velocity(&self) -> Option<f64> {
        self.apoapsis().map(|r_a| self.angular_momentum() / r_a)
    }
}

impl<P: HasMass, S: HasMass> Orbit<P, S> {
    /// Laplace sphere-of-influence radius of the secondary. The
    /// approximation only works for elliptical orbits.
    pub fn soi_radius(&self) -> Option<f64> {
        let mu_1 = self.primary.mu();
        let mu_2 = self.secondary.mu();

        let sma = self.semimajor_axis();
        if sma <= 0.0 {
            return None;
        }

        Some(sma * (mu_2 / mu_1).powf(0.4))
    }
}

impl<P, S> TimedOrbit<P, S> {
    pub fn from_orbit(orbit: Orbit<P, S>, time_at_periapsis: f64) -> Self {
        Self {
            orbit,
            time_at_periapsis,
        }
    }

    pub fn orbit(&self) -> &Orbit<P, S> {
        &self.orbit
    }

    pub fn time_at_periapsis(&self) -> f64 {
        self.time_at_periapsis
    }
}

impl<P: HasMass, S> TimedOrbit<P, S> {
    /// Builds an orbit from its mean anomaly at some epoch. Only closed orbits
    /// have a mean anomaly, so anything else is rejected.
    pub fn from_mean_anomaly(orbit: Orbit<P, S>, mean_anomaly: f64, epoch: f64) -> Option<Self> {
        // M = 2pi/P (t - t_periapse)
        let period = orbit.period()?;
        let time_since_periapsis = mean_anomaly * period / 2.0 / PI;
        Some(Self::from_orbit(orbit, epoch - time_since_periapsis))
    }

    pub fn state_at_time(&self, time: f64) -> Option<CartesianState<&P>> {
        let mut time_since_periapsis = time - self.time_at_periapsis;

        // Wrap closed orbits back to their first lap, so that late times don't
        // lose precision in the anomaly solve
        if let Some(period) = self.orbit.period() {
            time_since_periapsis = time_since_periapsis.rem_euclid(period);
        }

        self.orbit.get_state_at_tsp(time_since_periapsis)
    }
}

impl<P: HasMass> TimedOrbit<P, ()> {
    pub fn from_state(state: CartesianState<P>, current_time: f64) -> Option<Self> {
        let position = state.position();
        let orbit = state.into_orbit();

        // Note that the value of the anomaly for some orbits (e.g. circular)
        // depends on which rotation we took.
        let pos_in_plane = orbit.rotation.inverse_transform_vector(&position);

        let theta = pos_in_plane.y.atan2(pos_in_plane.x);
        let tan_half_theta = (theta / 2.0).tan();
        let h = orbit.angular_momentum();
        if h == 0.0 {
            // Radial orbits have no well-defined anomaly
            return None;
        }
        let r_p = orbit.periapsis();
        let g2_over_g1 = r_p / h * tan_half_theta;

        let beta: f64 = orbit.beta();
        let beta_sqrt = beta.abs().sqrt();
        let s = if beta > 0.0 {
            // Elliptic: g2/g1 = tan(s sqrt(beta) / 2) / sqrt(beta)
            (g2_over_g1 * beta_sqrt).atan() * 2.0 / beta_sqrt
        } else if beta < 0.0 {
            // Hyperbolic: g2/g1 = tanh(s sqrt(-beta) / 2) / sqrt(-beta)
            (g2_over_g1 * beta_sqrt).atanh() * 2.0 / beta_sqrt
        } else {
            // Parabolic: g2/g1 = s/2
            2.0 * tan_half_theta
        };

        let time_since_periapsis = orbit.s_to_tsp(s);
        Some(Self::from_orbit(orbit, current_time - time_since_periapsis))
    }
}

fn rotation_from_angles(incl: f64, lan: f64, argp: f64) -> Rotation3<f64> {
    // We have an orbit in the xy plane where the periapsis is pointed along the
    // x-axis. So first, we rotate it around z until the periapsis is at argp
    // away from the x-axis (which will now be the ascending node). We then
    // rotate around x to get the inclination, and then one final turn around z
    // to get the correct longitude of the AN.
    Rotation3::from_axis_angle(&Vector3::z_axis(), lan)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), incl)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argp)
}
